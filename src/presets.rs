//! Named entrance animations.
//!
//! Every animated block on the page picks one of these by key. The table is
//! closed: [`preset_for`] is total and answers unknown keys with the fade-in
//! preset, so a typo in markup degrades to a plain fade instead of an element
//! that never appears.

use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum AnimationKind {
    #[default]
    FadeIn,
    FadeUp,
    FadeDown,
    FadeLeft,
    FadeRight,
    ZoomIn,
    ZoomOut,
    SlideUp,
    SlideLeft,
    SlideRight,
    RotateIn,
}

impl AnimationKind {
    pub const ALL: [Self; 11] = [
        Self::FadeIn,
        Self::FadeUp,
        Self::FadeDown,
        Self::FadeLeft,
        Self::FadeRight,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::SlideUp,
        Self::SlideLeft,
        Self::SlideRight,
        Self::RotateIn,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::FadeIn => "fade-in",
            Self::FadeUp => "fade-up",
            Self::FadeDown => "fade-down",
            Self::FadeLeft => "fade-left",
            Self::FadeRight => "fade-right",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::SlideUp => "slide-up",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
            Self::RotateIn => "rotate-in",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
    }

    pub fn preset(self) -> AnimationPreset {
        PRESETS
            .iter()
            .copied()
            .find(|preset| preset.kind == self)
            .unwrap_or(FADE_IN)
    }
}

impl From<String> for AnimationKind {
    fn from(value: String) -> Self {
        Self::from_key(&value).unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    pub fn to_css(self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::Ease => "ease".to_string(),
            Self::EaseIn => "ease-in".to_string(),
            Self::EaseOut => "ease-out".to_string(),
            Self::EaseInOut => "ease-in-out".to_string(),
            Self::CubicBezier(x1, y1, x2, y2) => format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"),
        }
    }
}

/// One end of an animation: the styles applied while hidden or once visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionStyle {
    pub opacity: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    pub rotate: f64,
}

impl MotionStyle {
    pub const RESTING: Self = Self {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        rotate: 0.0,
    };

    const fn hidden() -> Self {
        Self {
            opacity: 0.0,
            ..Self::RESTING
        }
    }

    pub fn transform(&self) -> String {
        let mut transform = format!(
            "translate3d({}px, {}px, 0px) scale({})",
            self.translate_x, self.translate_y, self.scale
        );
        if self.rotate != 0.0 {
            let _ = write!(transform, " rotate({}deg)", self.rotate);
        }
        transform
    }

    pub fn to_css(&self) -> String {
        format!("opacity: {}; transform: {};", self.opacity, self.transform())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationPreset {
    pub kind: AnimationKind,
    pub hidden: MotionStyle,
    pub visible: MotionStyle,
    /// Seconds.
    pub duration: f64,
    /// Seconds.
    pub delay: f64,
    pub easing: Easing,
}

const EASE_OUT_QUART: Easing = Easing::CubicBezier(0.25, 1.0, 0.5, 1.0);
const EASE_STANDARD: Easing = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);

const FADE_IN: AnimationPreset = AnimationPreset {
    kind: AnimationKind::FadeIn,
    hidden: MotionStyle::hidden(),
    visible: MotionStyle::RESTING,
    duration: 0.6,
    delay: 0.0,
    easing: EASE_STANDARD,
};

const fn offset(kind: AnimationKind, x: f64, y: f64, duration: f64) -> AnimationPreset {
    AnimationPreset {
        kind,
        hidden: MotionStyle {
            translate_x: x,
            translate_y: y,
            ..MotionStyle::hidden()
        },
        visible: MotionStyle::RESTING,
        duration,
        delay: 0.0,
        easing: EASE_OUT_QUART,
    }
}

const fn scaled(kind: AnimationKind, scale: f64) -> AnimationPreset {
    AnimationPreset {
        kind,
        hidden: MotionStyle {
            scale,
            ..MotionStyle::hidden()
        },
        visible: MotionStyle::RESTING,
        duration: 0.5,
        delay: 0.0,
        easing: Easing::EaseOut,
    }
}

const PRESETS: [AnimationPreset; 11] = [
    FADE_IN,
    offset(AnimationKind::FadeUp, 0.0, 40.0, 0.6),
    offset(AnimationKind::FadeDown, 0.0, -40.0, 0.6),
    offset(AnimationKind::FadeLeft, 40.0, 0.0, 0.6),
    offset(AnimationKind::FadeRight, -40.0, 0.0, 0.6),
    scaled(AnimationKind::ZoomIn, 0.8),
    scaled(AnimationKind::ZoomOut, 1.2),
    offset(AnimationKind::SlideUp, 0.0, 100.0, 0.8),
    offset(AnimationKind::SlideLeft, 100.0, 0.0, 0.8),
    offset(AnimationKind::SlideRight, -100.0, 0.0, 0.8),
    AnimationPreset {
        kind: AnimationKind::RotateIn,
        hidden: MotionStyle {
            rotate: -10.0,
            scale: 0.95,
            ..MotionStyle::hidden()
        },
        visible: MotionStyle::RESTING,
        duration: 0.7,
        delay: 0.0,
        easing: Easing::EaseInOut,
    },
];

pub fn preset_for(key: &str) -> AnimationPreset {
    AnimationKind::from_key(key).unwrap_or_default().preset()
}
