//! Viewport observation.
//!
//! [`ViewportObserver`] owns at most one native observation at a time and
//! releases it on drop, target change or explicit disconnect. It reports a
//! boolean "visible" judgement and only when that judgement changes.

use std::{cell::Cell, fmt, rc::Rc, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ObserverConfigError {
    #[error("threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
    #[error("root margin needs 1 to 4 offsets, got {0}")]
    MarginArity(usize),
    #[error("invalid root margin offset {0:?}, expected px or %")]
    MarginOffset(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Offset {
    Px(f64),
    Percent(f64),
}

impl Offset {
    fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(value) => value,
            Self::Percent(value) => extent * value / 100.0,
        }
    }
}

impl FromStr for Offset {
    type Err = ObserverConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ObserverConfigError::MarginOffset(raw.to_string());
        let (number, percent) = if let Some(number) = raw.strip_suffix('%') {
            (number, true)
        } else if let Some(number) = raw.strip_suffix("px") {
            (number, false)
        } else if raw == "0" {
            ("0", false)
        } else {
            return Err(invalid());
        };

        let value: f64 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }

        Ok(if percent {
            Self::Percent(value)
        } else {
            Self::Px(value)
        })
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(value) => write!(f, "{value}px"),
            Self::Percent(value) => write!(f, "{value}%"),
        }
    }
}

/// CSS-margin-like offsets applied to the viewport before intersection is
/// computed. Positive values grow the root, negative values shrink it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: Offset,
    pub right: Offset,
    pub bottom: Offset,
    pub left: Offset,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(Offset::Px(0.0))
    }
}

impl RootMargin {
    pub fn uniform(offset: Offset) -> Self {
        Self {
            top: offset,
            right: offset,
            bottom: offset,
            left: offset,
        }
    }

    /// Expands (or shrinks) `root` by this margin. Percentages resolve against
    /// the root's width for left/right and its height for top/bottom.
    pub fn apply(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let right = self.right.resolve(root.width);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);

        Rect {
            x: root.x - left,
            y: root.y - top,
            width: (root.width + left + right).max(0.0),
            height: (root.height + top + bottom).max(0.0),
        }
    }
}

impl FromStr for RootMargin {
    type Err = ObserverConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let offsets = raw
            .split_whitespace()
            .map(str::parse::<Offset>)
            .collect::<Result<Vec<_>, _>>()?;

        match offsets.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            other => Err(ObserverConfigError::MarginArity(other.len())),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        (right >= x && bottom >= y).then(|| Rect::new(x, y, right - x, bottom - y))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl IntersectionEntry {
    /// Computes the entry for `target` against `root` expanded by `margin`.
    /// Edge-adjacent rectangles intersect with a ratio of zero.
    pub fn measure(target: Rect, root: Rect, margin: &RootMargin) -> Self {
        let root = margin.apply(root);
        match target.intersection(&root) {
            Some(overlap) => {
                let ratio = if target.area() > 0.0 {
                    (overlap.area() / target.area()).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                Self {
                    is_intersecting: true,
                    ratio,
                }
            }
            None => Self {
                is_intersecting: false,
                ratio: 0.0,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverConfig {
    threshold: f64,
    root_margin: RootMargin,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
        }
    }
}

impl ObserverConfig {
    pub fn new(threshold: f64, root_margin: &str) -> Result<Self, ObserverConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ObserverConfigError::ThresholdOutOfRange(threshold));
        }
        Ok(Self {
            threshold,
            root_margin: root_margin.parse()?,
        })
    }

    /// Like [`ObserverConfig::new`] but repairs bad input instead of failing:
    /// the threshold is clamped and an unparsable margin becomes zero.
    pub fn lenient(threshold: f64, root_margin: &str) -> Self {
        let clamped = if threshold.is_nan() {
            0.0
        } else {
            threshold.clamp(0.0, 1.0)
        };
        if clamped != threshold {
            log::warn!("observer threshold {threshold} clamped to {clamped}");
        }

        let root_margin = root_margin.parse().unwrap_or_else(|err| {
            log::warn!("ignoring root margin {root_margin:?}: {err}");
            RootMargin::default()
        });

        Self {
            threshold: clamped,
            root_margin,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn root_margin(&self) -> &RootMargin {
        &self.root_margin
    }

    pub fn is_visible(&self, entry: IntersectionEntry) -> bool {
        if self.threshold == 0.0 {
            entry.is_intersecting
        } else {
            entry.is_intersecting && entry.ratio >= self.threshold
        }
    }
}

pub type EntryCallback = Rc<dyn Fn(IntersectionEntry)>;

pub trait IntersectionBackend: Clone {
    type Target: Clone + PartialEq;
    type Handle;

    fn is_supported(&self) -> bool;

    fn observe(
        &self,
        target: &Self::Target,
        config: &ObserverConfig,
        on_entry: EntryCallback,
    ) -> Option<Self::Handle>;

    fn disconnect(&self, handle: Self::Handle);
}

struct Observation<B: IntersectionBackend> {
    target: B::Target,
    handle: Option<B::Handle>,
    live: Rc<Cell<bool>>,
}

pub struct ViewportObserver<B: IntersectionBackend> {
    backend: B,
    config: ObserverConfig,
    on_change: Rc<dyn Fn(bool)>,
    current: Option<Observation<B>>,
}

impl<B: IntersectionBackend> ViewportObserver<B> {
    pub fn new(backend: B, config: ObserverConfig, on_change: impl Fn(bool) + 'static) -> Self {
        Self {
            backend,
            config,
            on_change: Rc::new(on_change),
            current: None,
        }
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub fn is_observing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|observation| observation.handle.is_some())
    }

    /// Starts observing `target`, releasing any previous target first.
    pub fn observe(&mut self, target: B::Target) {
        if self
            .current
            .as_ref()
            .is_some_and(|observation| observation.target == target)
        {
            return;
        }
        self.disconnect();

        let live = Rc::new(Cell::new(true));
        if !self.backend.is_supported() {
            log::warn!("intersection observation unavailable, treating element as visible");
            self.current = Some(Observation {
                target,
                handle: None,
                live,
            });
            (self.on_change)(true);
            return;
        }

        let last = Rc::new(Cell::new(None::<bool>));
        let on_entry: EntryCallback = {
            let config = self.config;
            let on_change = self.on_change.clone();
            let live = live.clone();
            Rc::new(move |entry| {
                if !live.get() {
                    return;
                }
                let visible = config.is_visible(entry);
                if last.replace(Some(visible)) != Some(visible) {
                    on_change(visible);
                }
            })
        };

        let handle = self.backend.observe(&target, &self.config, on_entry);
        if handle.is_none() {
            log::warn!("failed to start intersection observation");
        }
        self.current = Some(Observation {
            target,
            handle,
            live,
        });
    }

    pub fn disconnect(&mut self) {
        if let Some(observation) = self.current.take() {
            observation.live.set(false);
            if let Some(handle) = observation.handle {
                self.backend.disconnect(handle);
            }
        }
    }
}

impl<B: IntersectionBackend> Drop for ViewportObserver<B> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// In-memory viewport for driving observers without a browser.
#[cfg(test)]
pub(crate) mod sim {
    use super::*;
    use std::{cell::RefCell, collections::HashMap};

    struct SimObservation {
        target: u32,
        config: ObserverConfig,
        on_entry: EntryCallback,
    }

    struct SimState {
        supported: bool,
        viewport: Rect,
        elements: HashMap<u32, Rect>,
        observations: HashMap<u64, SimObservation>,
        next_handle: u64,
        delivered: usize,
    }

    /// Elements are plain ids laid out on a vertical page; scrolling moves
    /// the viewport.
    #[derive(Clone)]
    pub(crate) struct SimulatedViewport {
        state: Rc<RefCell<SimState>>,
    }

    impl SimulatedViewport {
        pub(crate) fn new(width: f64, height: f64) -> Self {
            Self {
                state: Rc::new(RefCell::new(SimState {
                    supported: true,
                    viewport: Rect::new(0.0, 0.0, width, height),
                    elements: HashMap::new(),
                    observations: HashMap::new(),
                    next_handle: 1,
                    delivered: 0,
                })),
            }
        }

        pub(crate) fn unsupported(width: f64, height: f64) -> Self {
            let viewport = Self::new(width, height);
            viewport.state.borrow_mut().supported = false;
            viewport
        }

        pub(crate) fn place(&self, id: u32, rect: Rect) {
            self.state.borrow_mut().elements.insert(id, rect);
        }

        pub(crate) fn scroll_to(&self, y: f64) {
            self.state.borrow_mut().viewport.y = y;
            self.deliver_all();
        }

        pub(crate) fn active_observations(&self) -> usize {
            self.state.borrow().observations.len()
        }

        pub(crate) fn delivered(&self) -> usize {
            self.state.borrow().delivered
        }

        fn entry_for(state: &SimState, target: u32, config: &ObserverConfig) -> IntersectionEntry {
            let rect = state.elements.get(&target).copied().unwrap_or_default();
            IntersectionEntry::measure(rect, state.viewport, config.root_margin())
        }

        fn deliver_all(&self) {
            let pending: Vec<(u64, EntryCallback, IntersectionEntry)> = {
                let state = self.state.borrow();
                let mut handles: Vec<_> = state.observations.keys().copied().collect();
                handles.sort_unstable();
                handles
                    .into_iter()
                    .filter_map(|handle| {
                        let observation = state.observations.get(&handle)?;
                        Some((
                            handle,
                            observation.on_entry.clone(),
                            Self::entry_for(&state, observation.target, &observation.config),
                        ))
                    })
                    .collect()
            };

            for (handle, on_entry, entry) in pending {
                {
                    let mut state = self.state.borrow_mut();
                    // an earlier callback in this batch may have disconnected it
                    if !state.observations.contains_key(&handle) {
                        continue;
                    }
                    state.delivered += 1;
                }
                on_entry(entry);
            }
        }
    }

    impl IntersectionBackend for SimulatedViewport {
        type Target = u32;
        type Handle = u64;

        fn is_supported(&self) -> bool {
            self.state.borrow().supported
        }

        fn observe(
            &self,
            target: &u32,
            config: &ObserverConfig,
            on_entry: EntryCallback,
        ) -> Option<u64> {
            let (handle, initial) = {
                let mut state = self.state.borrow_mut();
                let handle = state.next_handle;
                state.next_handle += 1;
                let initial = Self::entry_for(&state, *target, config);
                state.observations.insert(
                    handle,
                    SimObservation {
                        target: *target,
                        config: *config,
                        on_entry: on_entry.clone(),
                    },
                );
                state.delivered += 1;
                (handle, initial)
            };
            on_entry(initial);
            Some(handle)
        }

        fn disconnect(&self, handle: u64) {
            self.state.borrow_mut().observations.remove(&handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sim::SimulatedViewport;
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, impl Fn(bool) + 'static) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        (events, move |visible| sink.borrow_mut().push(visible))
    }

    #[test]
    fn root_margin_accepts_one_to_four_values() {
        let one: RootMargin = "10px".parse().expect("one value");
        assert_eq!(one, RootMargin::uniform(Offset::Px(10.0)));

        let two: RootMargin = "-100px 0px".parse().expect("two values");
        assert_eq!(two.top, Offset::Px(-100.0));
        assert_eq!(two.left, Offset::Px(0.0));

        let three: RootMargin = "1px 2% 3px".parse().expect("three values");
        assert_eq!(three.right, Offset::Percent(2.0));
        assert_eq!(three.bottom, Offset::Px(3.0));

        let four: RootMargin = "0 0 -80px 0".parse().expect("four values");
        assert_eq!(four.bottom, Offset::Px(-80.0));
        assert_eq!(four.to_string(), "0px 0px -80px 0px");
    }

    #[test]
    fn root_margin_rejects_bad_input() {
        assert_eq!(
            "".parse::<RootMargin>(),
            Err(ObserverConfigError::MarginArity(0))
        );
        assert_eq!(
            "1px 1px 1px 1px 1px".parse::<RootMargin>(),
            Err(ObserverConfigError::MarginArity(5))
        );
        assert_eq!(
            "10em".parse::<RootMargin>(),
            Err(ObserverConfigError::MarginOffset("10em".to_string()))
        );
    }

    #[test]
    fn negative_margin_shrinks_root() {
        let margin: RootMargin = "-100px 10%".parse().expect("valid margin");
        let root = margin.apply(Rect::new(0.0, 0.0, 1000.0, 800.0));

        assert_eq!(root, Rect::new(-100.0, 100.0, 1200.0, 600.0));
    }

    #[test]
    fn threshold_must_be_a_fraction() {
        assert_eq!(
            ObserverConfig::new(1.2, "0px"),
            Err(ObserverConfigError::ThresholdOutOfRange(1.2))
        );
        let lenient = ObserverConfig::lenient(-0.5, "nonsense");
        assert_eq!(lenient.threshold(), 0.0);
        assert_eq!(*lenient.root_margin(), RootMargin::default());
    }

    #[test]
    fn ratio_reaching_threshold_exactly_is_visible() {
        for threshold in [0.0, 0.1, 0.25, 0.5, 0.75, 1.0] {
            let config = ObserverConfig::new(threshold, "0px").expect("valid config");
            let entry = IntersectionEntry {
                is_intersecting: true,
                ratio: threshold,
            };
            assert!(config.is_visible(entry), "threshold {threshold}");
        }
    }

    #[test]
    fn measure_reports_partial_overlap() {
        let entry = IntersectionEntry::measure(
            Rect::new(0.0, 700.0, 100.0, 200.0),
            Rect::new(0.0, 0.0, 1000.0, 800.0),
            &RootMargin::default(),
        );
        assert!(entry.is_intersecting);
        assert_eq!(entry.ratio, 0.5);

        let shrunk: RootMargin = "0px 0px -100px 0px".parse().expect("valid margin");
        let entry = IntersectionEntry::measure(
            Rect::new(0.0, 700.0, 100.0, 200.0),
            Rect::new(0.0, 0.0, 1000.0, 800.0),
            &shrunk,
        );
        assert!(entry.is_intersecting);
        assert_eq!(entry.ratio, 0.0);
    }

    #[test]
    fn reports_only_crossings() {
        let viewport = SimulatedViewport::new(1000.0, 800.0);
        viewport.place(1, Rect::new(0.0, 1200.0, 100.0, 200.0));
        let (events, sink) = recorder();
        let mut observer = ViewportObserver::new(
            viewport.clone(),
            ObserverConfig::new(0.5, "0px").expect("valid config"),
            sink,
        );

        observer.observe(1);
        viewport.scroll_to(100.0);
        viewport.scroll_to(600.0);
        viewport.scroll_to(700.0);
        viewport.scroll_to(0.0);

        assert_eq!(*events.borrow(), vec![false, true, false]);
    }

    #[test]
    fn switching_targets_never_observes_both() {
        let viewport = SimulatedViewport::new(1000.0, 800.0);
        let (_, sink) = recorder();
        let mut observer = ViewportObserver::new(viewport.clone(), ObserverConfig::default(), sink);

        observer.observe(1);
        observer.observe(1);
        assert_eq!(viewport.active_observations(), 1);

        observer.observe(2);
        assert_eq!(viewport.active_observations(), 1);

        drop(observer);
        assert_eq!(viewport.active_observations(), 0);
    }

    #[test]
    fn unsupported_host_reports_visible_immediately() {
        let viewport = SimulatedViewport::unsupported(1000.0, 800.0);
        let (events, sink) = recorder();
        let mut observer = ViewportObserver::new(viewport.clone(), ObserverConfig::default(), sink);

        observer.observe(7);

        assert_eq!(*events.borrow(), vec![true]);
        assert!(!observer.is_observing());
        assert_eq!(viewport.active_observations(), 0);
    }

    #[test]
    fn disconnected_observer_stays_silent() {
        let viewport = SimulatedViewport::new(1000.0, 800.0);
        viewport.place(1, Rect::new(0.0, 1200.0, 100.0, 200.0));
        let (events, sink) = recorder();
        let mut observer = ViewportObserver::new(viewport.clone(), ObserverConfig::default(), sink);

        observer.observe(1);
        observer.disconnect();
        viewport.scroll_to(1200.0);

        assert_eq!(*events.borrow(), vec![false]);
        assert!(!observer.is_observing());
    }
}
