use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Storage,
};

use crate::{
    observer::{EntryCallback, IntersectionBackend, IntersectionEntry, ObserverConfig},
    platform::{KeyValueStore, MediaPreferences},
    theme::ThemePalette,
};

pub const DARK_QUERY: &str = "(prefers-color-scheme: dark)";
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

#[derive(Clone, Copy, Default)]
pub struct DomIntersection;

pub struct DomObservation {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl IntersectionBackend for DomIntersection {
    type Target = Element;
    type Handle = DomObservation;

    fn is_supported(&self) -> bool {
        window()
            .map(|w| Reflect::has(&w, &JsValue::from_str("IntersectionObserver")).unwrap_or(false))
            .unwrap_or(false)
    }

    fn observe(
        &self,
        target: &Element,
        config: &ObserverConfig,
        on_entry: EntryCallback,
    ) -> Option<DomObservation> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    on_entry(IntersectionEntry {
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    });
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(config.threshold()));
        init.set_root_margin(&config.root_margin().to_string());

        let observer = match IntersectionObserver::new_with_options(
            callback.as_ref().unchecked_ref(),
            &init,
        ) {
            Ok(observer) => observer,
            Err(err) => {
                log::warn!("IntersectionObserver rejected its options: {err:?}");
                return None;
            }
        };
        observer.observe(target);

        Some(DomObservation {
            observer,
            _callback: callback,
        })
    }

    fn disconnect(&self, handle: DomObservation) {
        handle.observer.disconnect();
    }
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

#[derive(Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = local_storage() else {
            return;
        };
        if let Err(err) = storage.set_item(key, value) {
            log::debug!("could not persist {key}: {err:?}");
        }
    }
}

fn media_matches(query: &str) -> bool {
    window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

#[derive(Clone, Copy, Default)]
pub struct BrowserMedia;

impl MediaPreferences for BrowserMedia {
    fn prefers_dark(&self) -> bool {
        media_matches(DARK_QUERY)
    }

    fn prefers_reduced_motion(&self) -> bool {
        media_matches(REDUCED_MOTION_QUERY)
    }
}

pub struct ListenerGuard {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
    pub fn new(target: EventTarget, event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|err| log::warn!("could not listen for {event}: {err:?}"))
            .ok()?;
        Some(Self {
            target,
            event,
            callback,
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Calls `on_change` with the new match state whenever `query` flips.
pub fn watch_media(query: &str, on_change: impl Fn(bool) + 'static) -> Option<ListenerGuard> {
    let list = window()?.match_media(query).ok().flatten()?;
    let target: EventTarget = list.clone().into();
    ListenerGuard::new(target, "change", move |_| on_change(list.matches()))
}

pub fn on_window_event(event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<ListenerGuard> {
    let target: EventTarget = window()?.into();
    ListenerGuard::new(target, event, handler)
}

fn root_element() -> Option<HtmlElement> {
    window()?
        .document()?
        .document_element()?
        .dyn_into::<HtmlElement>()
        .ok()
}

pub fn apply_theme(palette: &ThemePalette) {
    let Some(root) = root_element() else {
        return;
    };
    let _ = root.set_attribute("data-theme", palette.id.as_str());
    let style = root.style();
    for (name, value) in palette.colors {
        let _ = style.set_property(&format!("--color-{name}"), value);
    }
}

/// Applies `palette` inside a view transition when the browser has one and
/// motion is not reduced.
pub fn apply_theme_with_transition(palette: &'static ThemePalette) {
    if BrowserMedia.prefers_reduced_motion() {
        apply_theme(palette);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        apply_theme(palette);
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        apply_theme(palette);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        apply_theme(palette);
        return;
    };

    let callback = Closure::once_into_js(move || apply_theme(palette));
    if start_view_transition
        .call1(&document_js, &callback)
        .is_err()
    {
        apply_theme(palette);
    }
}

pub fn scroll_y() -> f64 {
    window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

pub fn viewport_height() -> f64 {
    window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0)
}

pub fn document_height() -> f64 {
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0)
}

pub fn section_top(id: &str) -> Option<f64> {
    let element = window()?.document()?.get_element_by_id(id)?;
    Some(element.get_bounding_client_rect().top() + scroll_y())
}

/// Scrolls the element with `id` to the top of the viewport. Returns `false`
/// when there is no such element.
pub fn scroll_to_section(id: &str) -> bool {
    let Some(element) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    else {
        return false;
    };

    let options = ScrollIntoViewOptions::new();
    options.set_block(ScrollLogicalPosition::Start);
    options.set_behavior(if BrowserMedia.prefers_reduced_motion() {
        ScrollBehavior::Instant
    } else {
        ScrollBehavior::Smooth
    });
    element.scroll_into_view_with_scroll_into_view_options(&options);
    true
}
