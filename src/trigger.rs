use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::observer::{IntersectionBackend, ObserverConfig, ViewportObserver};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisibilityState {
    #[default]
    Hidden,
    Visible,
}

impl VisibilityState {
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Reveal once, then stop observing.
    #[default]
    Once,
    /// Hide again whenever the element leaves the viewport.
    Repeatable,
}

impl TriggerPolicy {
    pub fn from_once(once: bool) -> Self {
        if once {
            Self::Once
        } else {
            Self::Repeatable
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub changed: bool,
    pub detach: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerMachine {
    policy: TriggerPolicy,
    state: VisibilityState,
    detached: bool,
}

impl TriggerMachine {
    pub fn new(policy: TriggerPolicy) -> Self {
        Self {
            policy,
            state: VisibilityState::Hidden,
            detached: false,
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn on_intersection(&mut self, intersecting: bool) -> Step {
        if self.detached {
            return Step::default();
        }

        match (self.state, intersecting) {
            (VisibilityState::Hidden, true) => self.enter_visible(),
            (VisibilityState::Visible, false) if self.policy == TriggerPolicy::Repeatable => {
                self.state = VisibilityState::Hidden;
                Step {
                    changed: true,
                    detach: false,
                }
            }
            _ => Step::default(),
        }
    }

    pub fn force_visible(&mut self) -> Step {
        if self.state == VisibilityState::Hidden {
            return self.enter_visible();
        }
        if self.policy == TriggerPolicy::Once && !self.detached {
            self.detached = true;
            return Step {
                changed: false,
                detach: true,
            };
        }
        Step::default()
    }

    /// Back to hidden and ready to observe again, whatever the policy.
    pub fn reset(&mut self) -> Step {
        let changed = self.state == VisibilityState::Visible;
        self.state = VisibilityState::Hidden;
        self.detached = false;
        Step {
            changed,
            detach: false,
        }
    }

    fn enter_visible(&mut self) -> Step {
        self.state = VisibilityState::Visible;
        let detach = self.policy == TriggerPolicy::Once;
        self.detached = detach;
        Step {
            changed: true,
            detach,
        }
    }
}

struct Shared<B: IntersectionBackend> {
    backend: B,
    config: ObserverConfig,
    machine: Cell<TriggerMachine>,
    observer: RefCell<Option<ViewportObserver<B>>>,
    target: RefCell<Option<B::Target>>,
    listener: Rc<dyn Fn(VisibilityState)>,
}

impl<B: IntersectionBackend + 'static> Shared<B> {
    fn step(&self, event: impl FnOnce(&mut TriggerMachine) -> Step) -> Step {
        let mut machine = self.machine.get();
        let step = event(&mut machine);
        self.machine.set(machine);
        step
    }

    fn apply(&self, step: Step) {
        if step.detach {
            self.release();
        }
        if step.changed {
            (self.listener)(self.machine.get().state());
        }
    }

    fn release(&self) {
        // `attach` holds the observer outside the slot while it registers,
        // and drops it itself if the machine detached meanwhile.
        let observer = match self.observer.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        drop(observer);
    }

    fn arm(shared: &Rc<Self>) -> ViewportObserver<B> {
        let weak = Rc::downgrade(shared);
        ViewportObserver::new(shared.backend.clone(), shared.config, move |visible| {
            if let Some(shared) = weak.upgrade() {
                let step = shared.step(|machine| machine.on_intersection(visible));
                shared.apply(step);
            }
        })
    }

    fn attach(shared: &Rc<Self>, target: B::Target) {
        *shared.target.borrow_mut() = Some(target.clone());
        if shared.machine.get().is_detached() {
            return;
        }

        let existing = shared.observer.borrow_mut().take();
        let mut observer = existing.unwrap_or_else(|| Self::arm(shared));
        observer.observe(target);

        if !shared.machine.get().is_detached() {
            *shared.observer.borrow_mut() = Some(observer);
        }
    }
}

/// Converts viewport crossings into a [`VisibilityState`] under a
/// [`TriggerPolicy`].
///
/// The trigger owns its observation: dropping it, or a once-policy trigger
/// turning visible, releases the native observer.
pub struct AnimationTrigger<B: IntersectionBackend + 'static> {
    shared: Rc<Shared<B>>,
}

impl<B: IntersectionBackend + 'static> AnimationTrigger<B> {
    pub fn new(
        backend: B,
        config: ObserverConfig,
        policy: TriggerPolicy,
        listener: impl Fn(VisibilityState) + 'static,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                backend,
                config,
                machine: Cell::new(TriggerMachine::new(policy)),
                observer: RefCell::new(None),
                target: RefCell::new(None),
                listener: Rc::new(listener),
            }),
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.shared.machine.get().state()
    }

    pub fn is_observing(&self) -> bool {
        self.shared
            .observer
            .borrow()
            .as_ref()
            .is_some_and(ViewportObserver::is_observing)
    }

    /// Starts (or moves) observation to `target`. A once-policy trigger that
    /// already fired ignores this until [`AnimationTrigger::reset`].
    pub fn attach(&self, target: B::Target) {
        Shared::attach(&self.shared, target);
    }

    /// Reveals immediately, e.g. before a programmatic scroll to the element.
    pub fn force_visible(&self) {
        let step = self.shared.step(TriggerMachine::force_visible);
        self.shared.apply(step);
    }

    /// Returns to hidden and re-observes the last attached target.
    pub fn reset(&self) {
        self.shared.release();
        let step = self.shared.step(TriggerMachine::reset);
        self.shared.apply(step);

        let target = self.shared.target.borrow().clone();
        if let Some(target) = target {
            Shared::attach(&self.shared, target);
        }
    }
}

impl<B: IntersectionBackend + 'static> Drop for AnimationTrigger<B> {
    fn drop(&mut self) {
        self.shared.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{sim::SimulatedViewport, Rect};

    fn recorder() -> (Rc<RefCell<Vec<VisibilityState>>>, impl Fn(VisibilityState) + 'static) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        (events, move |state| sink.borrow_mut().push(state))
    }

    /// 1000x800 viewport with element 1 at y 1000..1200.
    fn page() -> SimulatedViewport {
        let viewport = SimulatedViewport::new(1000.0, 800.0);
        viewport.place(1, Rect::new(0.0, 1000.0, 400.0, 200.0));
        viewport
    }

    fn config(threshold: f64) -> ObserverConfig {
        ObserverConfig::new(threshold, "0px").expect("valid config")
    }

    #[test]
    fn machine_starts_hidden() {
        let machine = TriggerMachine::new(TriggerPolicy::Once);
        assert_eq!(machine.state(), VisibilityState::Hidden);
        assert!(!machine.is_detached());
    }

    #[test]
    fn once_machine_ignores_leaving() {
        let mut machine = TriggerMachine::new(TriggerPolicy::Once);

        assert_eq!(
            machine.on_intersection(true),
            Step {
                changed: true,
                detach: true
            }
        );
        assert_eq!(machine.on_intersection(false), Step::default());
        assert_eq!(machine.on_intersection(true), Step::default());
        assert_eq!(machine.state(), VisibilityState::Visible);
    }

    #[test]
    fn repeatable_machine_cycles() {
        let mut machine = TriggerMachine::new(TriggerPolicy::Repeatable);

        assert!(machine.on_intersection(true).changed);
        assert!(machine.on_intersection(false).changed);
        assert!(machine.on_intersection(true).changed);
        assert!(!machine.is_detached());
    }

    #[test]
    fn hidden_machine_ignores_not_intersecting() {
        let mut machine = TriggerMachine::new(TriggerPolicy::Repeatable);
        assert_eq!(machine.on_intersection(false), Step::default());
    }

    #[test]
    fn reaching_threshold_exactly_reveals() {
        for (threshold, scroll) in [(0.25, 250.0), (0.5, 300.0), (1.0, 400.0)] {
            let viewport = page();
            let (events, sink) = recorder();
            let trigger =
                AnimationTrigger::new(viewport.clone(), config(threshold), TriggerPolicy::Once, sink);

            trigger.attach(1);
            viewport.scroll_to(scroll - 1.0);
            assert_eq!(trigger.state(), VisibilityState::Hidden, "threshold {threshold}");

            viewport.scroll_to(scroll);
            assert_eq!(trigger.state(), VisibilityState::Visible, "threshold {threshold}");
            assert_eq!(*events.borrow(), vec![VisibilityState::Visible]);
        }
    }

    #[test]
    fn once_trigger_detaches_on_reveal() {
        let viewport = page();
        let (events, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.0), TriggerPolicy::Once, sink);

        trigger.attach(1);
        assert!(trigger.is_observing());
        viewport.scroll_to(600.0);

        assert_eq!(viewport.active_observations(), 0);
        assert!(!trigger.is_observing());
        let delivered = viewport.delivered();

        viewport.scroll_to(0.0);
        viewport.scroll_to(600.0);
        trigger.attach(1);

        assert_eq!(viewport.delivered(), delivered);
        assert_eq!(trigger.state(), VisibilityState::Visible);
        assert_eq!(*events.borrow(), vec![VisibilityState::Visible]);
    }

    #[test]
    fn repeatable_trigger_hides_and_shows_again() {
        let viewport = page();
        let (events, sink) = recorder();
        let trigger =
            AnimationTrigger::new(viewport.clone(), config(0.5), TriggerPolicy::Repeatable, sink);

        trigger.attach(1);
        for _ in 0..2 {
            viewport.scroll_to(600.0);
            viewport.scroll_to(0.0);
        }

        assert_eq!(
            *events.borrow(),
            vec![
                VisibilityState::Visible,
                VisibilityState::Hidden,
                VisibilityState::Visible,
                VisibilityState::Hidden,
            ]
        );
        assert_eq!(viewport.active_observations(), 1);
    }

    #[test]
    fn element_already_in_view_reveals_on_attach() {
        let viewport = page();
        viewport.scroll_to(700.0);
        let (_, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.0), TriggerPolicy::Once, sink);

        trigger.attach(1);

        assert_eq!(trigger.state(), VisibilityState::Visible);
        assert_eq!(viewport.active_observations(), 0);
    }

    #[test]
    fn unsupported_host_reveals_without_observing() {
        let viewport = SimulatedViewport::unsupported(1000.0, 800.0);
        let (events, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.2), TriggerPolicy::Once, sink);

        trigger.attach(1);

        assert_eq!(trigger.state(), VisibilityState::Visible);
        assert_eq!(*events.borrow(), vec![VisibilityState::Visible]);
        assert_eq!(viewport.active_observations(), 0);
    }

    #[test]
    fn dropping_before_intersection_leaves_nothing_behind() {
        let viewport = page();
        let (events, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.2), TriggerPolicy::Once, sink);

        trigger.attach(1);
        assert_eq!(viewport.active_observations(), 1);
        drop(trigger);

        let delivered = viewport.delivered();
        viewport.scroll_to(600.0);

        assert_eq!(viewport.active_observations(), 0);
        assert_eq!(viewport.delivered(), delivered);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn force_visible_detaches_once_trigger() {
        let viewport = page();
        let (events, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.2), TriggerPolicy::Once, sink);

        trigger.attach(1);
        trigger.force_visible();

        assert_eq!(trigger.state(), VisibilityState::Visible);
        assert_eq!(viewport.active_observations(), 0);
        assert_eq!(*events.borrow(), vec![VisibilityState::Visible]);
    }

    #[test]
    fn reset_rearms_a_fired_once_trigger() {
        let viewport = page();
        let (events, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.0), TriggerPolicy::Once, sink);

        trigger.attach(1);
        viewport.scroll_to(600.0);
        viewport.scroll_to(0.0);
        trigger.reset();

        assert_eq!(trigger.state(), VisibilityState::Hidden);
        assert_eq!(viewport.active_observations(), 1);

        viewport.scroll_to(600.0);
        assert_eq!(
            *events.borrow(),
            vec![
                VisibilityState::Visible,
                VisibilityState::Hidden,
                VisibilityState::Visible,
            ]
        );
    }

    #[test]
    fn attaching_a_replacement_element_moves_observation() {
        let viewport = page();
        viewport.place(2, Rect::new(0.0, 1500.0, 400.0, 100.0));
        let (events, sink) = recorder();
        let trigger = AnimationTrigger::new(viewport.clone(), config(0.0), TriggerPolicy::Once, sink);

        trigger.attach(1);
        trigger.attach(2);
        assert_eq!(viewport.active_observations(), 1);

        // element 1 in view, but no longer observed
        viewport.scroll_to(600.0);
        assert_eq!(trigger.state(), VisibilityState::Hidden);

        viewport.scroll_to(900.0);
        assert_eq!(trigger.state(), VisibilityState::Visible);
        assert_eq!(viewport.active_observations(), 0);
        assert_eq!(*events.borrow(), vec![VisibilityState::Visible]);
    }

    #[test]
    fn nested_triggers_own_separate_observations() {
        let viewport = page();
        viewport.place(2, Rect::new(0.0, 1050.0, 200.0, 100.0));
        let (outer_events, outer_sink) = recorder();
        let (inner_events, inner_sink) = recorder();
        let outer =
            AnimationTrigger::new(viewport.clone(), config(0.0), TriggerPolicy::Once, outer_sink);
        let inner = AnimationTrigger::new(
            viewport.clone(),
            config(1.0),
            TriggerPolicy::Repeatable,
            inner_sink,
        );

        outer.attach(1);
        inner.attach(2);
        assert_eq!(viewport.active_observations(), 2);

        viewport.scroll_to(250.0);
        assert_eq!(outer.state(), VisibilityState::Visible);
        assert_eq!(inner.state(), VisibilityState::Hidden);
        assert_eq!(viewport.active_observations(), 1);

        viewport.scroll_to(400.0);
        assert_eq!(inner.state(), VisibilityState::Visible);
        assert_eq!(outer_events.borrow().len(), 1);
        assert_eq!(*inner_events.borrow(), vec![VisibilityState::Visible]);
    }
}
