use std::{cell::RefCell, collections::HashMap, rc::Rc};

use web_sys::Element;
use yew::prelude::*;

use super::dom::DomIntersection;
use crate::{
    config::SiteConfig,
    observer::ObserverConfig,
    section::{MotionOverrides, SectionMotion},
    trigger::{AnimationTrigger, TriggerPolicy, VisibilityState},
};

/// Environment motion preference, provided once at the app root.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionPreferences {
    pub reduced: bool,
}

#[hook]
pub fn use_reduced_motion() -> bool {
    use_context::<MotionPreferences>()
        .map(|preferences| preferences.reduced)
        .unwrap_or(false)
}

/// Lets navigation reveal a section before scrolling to it.
#[derive(Clone, Default)]
pub struct RevealRegistry {
    entries: Rc<RefCell<HashMap<String, Callback<()>>>>,
}

impl PartialEq for RevealRegistry {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl RevealRegistry {
    pub fn reveal(&self, id: &str) {
        let reveal = self.entries.borrow().get(id).cloned();
        if let Some(reveal) = reveal {
            reveal.emit(());
        }
    }

    fn register(&self, id: String, reveal: Callback<()>) {
        self.entries.borrow_mut().insert(id, reveal);
    }

    fn unregister(&self, id: &str) {
        self.entries.borrow_mut().remove(id);
    }
}

pub fn section_animation(site: &SiteConfig, id: &str) -> AttrValue {
    let kind = site
        .section(id)
        .map(|section| section.animation)
        .unwrap_or_default();
    AttrValue::Static(kind.key())
}

#[derive(Clone, Copy, PartialEq)]
pub struct TriggerOptions {
    pub config: ObserverConfig,
    pub policy: TriggerPolicy,
    pub disabled: bool,
}

pub struct TriggerHandle {
    pub state: VisibilityState,
    pub reveal: Callback<()>,
}

/// Binds an [`AnimationTrigger`] to the element behind `node` for as long as
/// the component is mounted or until `options` change.
#[hook]
pub fn use_animation_trigger(node: &NodeRef, options: TriggerOptions) -> TriggerHandle {
    let state = use_state_eq(|| {
        if options.disabled {
            VisibilityState::Visible
        } else {
            VisibilityState::Hidden
        }
    });
    let trigger = use_mut_ref(|| None::<AnimationTrigger<DomIntersection>>);

    {
        let node = node.clone();
        let setter = state.setter();
        let trigger = trigger.clone();
        use_effect_with(options, move |options| {
            if options.disabled {
                setter.set(VisibilityState::Visible);
            } else if let Some(element) = node.cast::<Element>() {
                let created = AnimationTrigger::new(
                    DomIntersection,
                    options.config,
                    options.policy,
                    move |next| setter.set(next),
                );
                created.attach(element);
                *trigger.borrow_mut() = Some(created);
            } else {
                log::debug!("animated element not mounted, nothing to observe");
            }

            move || {
                trigger.borrow_mut().take();
            }
        });
    }

    // The element behind `node` is replaced when the rendered tag changes.
    {
        let node = node.clone();
        let trigger = trigger.clone();
        use_effect(move || {
            if let (Some(element), Some(trigger)) =
                (node.cast::<Element>(), trigger.borrow().as_ref())
            {
                trigger.attach(element);
            }
            || ()
        });
    }

    let reveal = {
        let trigger = trigger.clone();
        Callback::from(move |_| {
            if let Some(trigger) = trigger.borrow().as_ref() {
                trigger.force_visible();
            }
        })
    };

    TriggerHandle {
        state: *state,
        reveal,
    }
}

#[hook]
fn use_reveal_registration(id: Option<AttrValue>, reveal: Callback<()>) {
    let registry = use_context::<RevealRegistry>();
    use_effect_with(id, move |id| {
        let key = id.as_ref().map(ToString::to_string);
        if let (Some(registry), Some(key)) = (registry.as_ref(), key.as_ref()) {
            registry.register(key.clone(), reveal);
        }
        move || {
            if let (Some(registry), Some(key)) = (registry, key) {
                registry.unregister(&key);
            }
        }
    });
}

#[derive(Properties, PartialEq)]
pub struct AnimatedSectionProps {
    #[prop_or_default]
    pub children: Html,
    #[prop_or(AttrValue::Static("fade-in"))]
    pub animation: AttrValue,
    #[prop_or_default]
    pub delay: Option<f64>,
    #[prop_or_default]
    pub duration: Option<f64>,
    #[prop_or_default]
    pub threshold: Option<f64>,
    #[prop_or_default]
    pub root_margin: Option<AttrValue>,
    #[prop_or(true)]
    pub once: bool,
    /// Defaults to the reduced-motion preference.
    #[prop_or_default]
    pub disabled: Option<bool>,
    #[prop_or_default]
    pub id: Option<AttrValue>,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or(AttrValue::Static("div"))]
    pub tag: AttrValue,
}

/// Renders its children hidden until they scroll into view, then plays the
/// named animation. Every instance owns its own trigger.
#[function_component(AnimatedSection)]
pub fn animated_section(props: &AnimatedSectionProps) -> Html {
    let site = use_context::<Rc<SiteConfig>>().unwrap_or_default();
    let reduced = use_reduced_motion();
    let disabled = props.disabled.unwrap_or(reduced);

    let config = ObserverConfig::lenient(
        props.threshold.unwrap_or(site.default_threshold),
        props
            .root_margin
            .as_deref()
            .unwrap_or(site.default_root_margin.as_str()),
    );
    let node = use_node_ref();
    let handle = use_animation_trigger(
        &node,
        TriggerOptions {
            config,
            policy: TriggerPolicy::from_once(props.once),
            disabled,
        },
    );
    use_reveal_registration(props.id.clone(), handle.reveal.clone());

    let motion = SectionMotion::new(
        &props.animation,
        MotionOverrides {
            delay: props.delay,
            duration: props.duration,
            easing: None,
        },
        disabled,
    );

    html! {
        <@{props.tag.to_string()}
            id={props.id.clone()}
            class={classes!(
                "animated",
                props.class.clone(),
                handle.state.is_visible().then_some("is-visible")
            )}
            style={motion.style(handle.state)}
            ref={node}
        >
            {props.children.clone()}
        </@>
    }
}
