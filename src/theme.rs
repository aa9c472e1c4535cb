use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::platform::{KeyValueStore, THEME_KEY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeId {
    #[default]
    Light,
    Dark,
}

impl ThemeId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn pressed(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "◐",
            Self::Dark => "◑",
        }
    }

    pub fn palette(self) -> &'static ThemePalette {
        match self {
            Self::Light => &LIGHT,
            Self::Dark => &DARK,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ThemePalette {
    pub id: ThemeId,
    pub colors: &'static [(&'static str, &'static str)],
}

impl ThemePalette {
    pub fn color(&self, name: &str) -> Option<&'static str> {
        self.colors
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn css_variables(&self) -> String {
        self.colors
            .iter()
            .map(|(name, value)| format!("--color-{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

static LIGHT: ThemePalette = ThemePalette {
    id: ThemeId::Light,
    colors: &[
        ("background", "#fafaf9"),
        ("surface", "#ffffff"),
        ("text", "#1c1917"),
        ("muted", "#78716c"),
        ("accent", "#4f46e5"),
        ("border", "#e7e5e4"),
        ("error", "#b91c1c"),
        ("success", "#15803d"),
    ],
};

static DARK: ThemePalette = ThemePalette {
    id: ThemeId::Dark,
    colors: &[
        ("background", "#0c0a09"),
        ("surface", "#1c1917"),
        ("text", "#f5f5f4"),
        ("muted", "#a8a29e"),
        ("accent", "#818cf8"),
        ("border", "#292524"),
        ("error", "#f87171"),
        ("success", "#4ade80"),
    ],
};

type Listener = Rc<dyn Fn(&'static ThemePalette)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    listeners: Weak<RefCell<Listeners>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Selection is persisted on write only. A system color-scheme change is
/// followed until the user picks a theme explicitly.
pub struct ThemeStore<S: KeyValueStore> {
    storage: S,
    active: ThemeId,
    manual: bool,
    listeners: Rc<RefCell<Listeners>>,
}

impl<S: KeyValueStore> ThemeStore<S> {
    pub fn load(storage: S, prefers_dark: bool) -> Self {
        let stored = storage.get(THEME_KEY).and_then(|value| ThemeId::parse(&value));
        let active = stored.unwrap_or(if prefers_dark {
            ThemeId::Dark
        } else {
            ThemeId::Light
        });
        log::debug!(
            "theme {} ({})",
            active.as_str(),
            if stored.is_some() { "stored" } else { "system" }
        );

        Self {
            storage,
            active,
            manual: stored.is_some(),
            listeners: Rc::default(),
        }
    }

    pub fn active(&self) -> ThemeId {
        self.active
    }

    pub fn active_palette(&self) -> &'static ThemePalette {
        self.active.palette()
    }

    /// Whether the user has chosen a theme (now or in an earlier session).
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Selects `id` as the user's choice. Returns `false`, without notifying
    /// or persisting, when `id` is already active.
    pub fn set_palette(&mut self, id: ThemeId) -> bool {
        if id == self.active {
            return false;
        }
        self.manual = true;
        self.storage.set(THEME_KEY, id.as_str());
        self.select(id);
        true
    }

    pub fn toggle(&mut self) -> ThemeId {
        self.set_palette(self.active.toggled());
        self.active
    }

    /// Follows an OS color-scheme change unless the user already chose.
    pub fn system_preference_changed(&mut self, prefers_dark: bool) -> bool {
        let id = if prefers_dark {
            ThemeId::Dark
        } else {
            ThemeId::Light
        };
        if self.manual || id == self.active {
            return false;
        }
        self.select(id);
        true
    }

    pub fn subscribe(&self, listener: impl Fn(&'static ThemePalette) + 'static) -> Subscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));

        Subscription {
            listeners: Rc::downgrade(&self.listeners),
            id,
        }
    }

    fn select(&mut self, id: ThemeId) {
        self.active = id;
        log::info!("theme changed to {}", id.as_str());

        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        let palette = id.palette();
        for listener in listeners {
            listener(palette);
        }
    }
}
