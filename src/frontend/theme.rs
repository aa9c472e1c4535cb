use std::{cell::RefCell, rc::Rc};

use yew::prelude::*;

use super::dom::{self, BrowserMedia, BrowserStorage, DARK_QUERY};
use crate::{
    platform::MediaPreferences,
    theme::{ThemeId, ThemePalette, ThemeStore},
};

type SharedStore = Rc<RefCell<ThemeStore<BrowserStorage>>>;

#[derive(Clone)]
pub struct ThemeContext {
    store: SharedStore,
    pub active: ThemeId,
}

impl PartialEq for ThemeContext {
    fn eq(&self, other: &Self) -> bool {
        self.active == other.active && Rc::ptr_eq(&self.store, &other.store)
    }
}

impl ThemeContext {
    pub fn palette(&self) -> &'static ThemePalette {
        self.active.palette()
    }

    pub fn toggle(&self) {
        self.store.borrow_mut().toggle();
    }

    pub fn set(&self, id: ThemeId) {
        self.store.borrow_mut().set_palette(id);
    }
}

/// Reads the active theme. Panics outside `<ThemeProvider>`.
#[hook]
pub fn use_theme() -> ThemeContext {
    use_context::<ThemeContext>()
        .expect("use_theme() called outside <ThemeProvider>; wrap the app root in it")
}

#[derive(Properties, PartialEq)]
pub struct ThemeProviderProps {
    #[prop_or_default]
    pub children: Html,
}

#[function_component(ThemeProvider)]
pub fn theme_provider(props: &ThemeProviderProps) -> Html {
    let store: SharedStore = use_memo((), |_| {
        RefCell::new(ThemeStore::load(BrowserStorage, BrowserMedia.prefers_dark()))
    });
    let active = use_state_eq(|| store.borrow().active());

    {
        let store = store.clone();
        let setter = active.setter();
        use_effect_with((), move |_| {
            dom::apply_theme(store.borrow().active_palette());

            let subscription = store.borrow().subscribe(move |palette| {
                dom::apply_theme_with_transition(palette);
                setter.set(palette.id);
            });

            let media_store = store.clone();
            let listener = dom::watch_media(DARK_QUERY, move |prefers_dark| {
                media_store
                    .borrow_mut()
                    .system_preference_changed(prefers_dark);
            });

            move || {
                drop(listener);
                drop(subscription);
            }
        });
    }

    let context = ThemeContext {
        store: store.clone(),
        active: *active,
    };

    html! {
        <ContextProvider<ThemeContext> context={context}>
            {props.children.clone()}
        </ContextProvider<ThemeContext>>
    }
}

#[function_component(ThemeToggle)]
pub fn theme_toggle() -> Html {
    let theme = use_theme();
    let onclick = {
        let theme = theme.clone();
        Callback::from(move |_: MouseEvent| theme.toggle())
    };

    html! {
        <button
            class="theme-toggle"
            type="button"
            aria-label={theme.active.toggle_label()}
            aria-pressed={theme.active.pressed().to_string()}
            onclick={onclick}
        >
            <span aria-hidden="true">{theme.active.icon()}</span>
        </button>
    }
}
