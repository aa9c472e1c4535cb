use crate::{
    presets::{preset_for, AnimationPreset, Easing, MotionStyle},
    trigger::VisibilityState,
};

/// Per-instance timing overrides. `None` keeps the preset's value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionOverrides {
    pub delay: Option<f64>,
    pub duration: Option<f64>,
    pub easing: Option<Easing>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionMotion {
    preset: AnimationPreset,
    overrides: MotionOverrides,
    disabled: bool,
}

impl SectionMotion {
    pub fn new(animation: &str, overrides: MotionOverrides, disabled: bool) -> Self {
        Self {
            preset: preset_for(animation),
            overrides,
            disabled,
        }
    }

    pub fn preset(&self) -> &AnimationPreset {
        &self.preset
    }

    /// Seconds; negative or non-finite overrides are ignored.
    pub fn duration(&self) -> f64 {
        if self.disabled {
            return 0.0;
        }
        sanitize(self.overrides.duration).unwrap_or(self.preset.duration)
    }

    pub fn delay(&self) -> f64 {
        if self.disabled {
            return 0.0;
        }
        sanitize(self.overrides.delay).unwrap_or(self.preset.delay)
    }

    pub fn easing(&self) -> Easing {
        self.overrides.easing.unwrap_or(self.preset.easing)
    }

    pub fn target(&self, state: VisibilityState) -> MotionStyle {
        if self.disabled || state.is_visible() {
            self.preset.visible
        } else {
            self.preset.hidden
        }
    }

    pub fn transition(&self) -> String {
        if self.disabled {
            return "none".to_string();
        }
        let duration = self.duration();
        let delay = self.delay();
        let easing = self.easing().to_css();
        format!("opacity {duration}s {easing} {delay}s, transform {duration}s {easing} {delay}s")
    }

    pub fn style(&self, state: VisibilityState) -> String {
        let mut style = self.target(state).to_css();
        style.push_str(" transition: ");
        style.push_str(&self.transition());
        style.push(';');
        if !self.disabled {
            style.push_str(" will-change: opacity, transform;");
        }
        style
    }
}

fn sanitize(seconds: Option<f64>) -> Option<f64> {
    seconds.filter(|value| value.is_finite() && *value >= 0.0)
}
