use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::{observer::RootMargin, presets::AnimationKind};

const SITE_CONFIG_JSON: &str = include_str!("../config/site.json");

const DEFAULT_SPLASH_MS: u64 = 1_800;
const DEFAULT_SUCCESS_MESSAGE_MS: u64 = 5_000;
const DEFAULT_SUBMIT_DELAY_MS: u64 = 1_500;
const DEFAULT_THRESHOLD: f64 = 0.2;
const DEFAULT_ROOT_MARGIN: &str = "0px 0px -80px 0px";
const DEFAULT_SCROLL_OFFSET_PX: f64 = 72.0;

const SPLASH_MS_BOUNDS: (u64, u64) = (0, 10_000);
const SUCCESS_MESSAGE_MS_BOUNDS: (u64, u64) = (1_000, 60_000);
const SUBMIT_DELAY_MS_BOUNDS: (u64, u64) = (0, 30_000);
const THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const SCROLL_OFFSET_PX_BOUNDS: (f64, f64) = (0.0, 400.0);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("site config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("site config lists no sections")]
    NoSections,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SectionEntry {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub animation: AnimationKind,
}

#[derive(Deserialize)]
struct RawSiteConfig {
    splash_ms: Option<u64>,
    success_message_ms: Option<u64>,
    submit_delay_ms: Option<u64>,
    default_threshold: Option<f64>,
    default_root_margin: Option<String>,
    scroll_offset_px: Option<f64>,
    #[serde(default)]
    sections: Vec<SectionEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub splash: Duration,
    pub success_message: Duration,
    pub submit_delay: Duration,
    pub default_threshold: f64,
    pub default_root_margin: String,
    pub scroll_offset_px: f64,
    pub sections: Vec<SectionEntry>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            splash: Duration::from_millis(DEFAULT_SPLASH_MS),
            success_message: Duration::from_millis(DEFAULT_SUCCESS_MESSAGE_MS),
            submit_delay: Duration::from_millis(DEFAULT_SUBMIT_DELAY_MS),
            default_threshold: DEFAULT_THRESHOLD,
            default_root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            scroll_offset_px: DEFAULT_SCROLL_OFFSET_PX,
            sections: default_sections(),
        }
    }
}

impl SiteConfig {
    /// Loads the embedded config, falling back to built-in defaults when it
    /// cannot be parsed.
    pub fn load() -> Self {
        match Self::from_json(SITE_CONFIG_JSON) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("using default site config: {err}");
                Self::default()
            }
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawSiteConfig = serde_json::from_str(raw)?;
        if raw.sections.is_empty() {
            return Err(ConfigError::NoSections);
        }

        let default_root_margin = root_margin_or_default(raw.default_root_margin);

        Ok(Self {
            splash: Duration::from_millis(u64_with_bounds(
                "splash_ms",
                raw.splash_ms,
                DEFAULT_SPLASH_MS,
                SPLASH_MS_BOUNDS,
            )),
            success_message: Duration::from_millis(u64_with_bounds(
                "success_message_ms",
                raw.success_message_ms,
                DEFAULT_SUCCESS_MESSAGE_MS,
                SUCCESS_MESSAGE_MS_BOUNDS,
            )),
            submit_delay: Duration::from_millis(u64_with_bounds(
                "submit_delay_ms",
                raw.submit_delay_ms,
                DEFAULT_SUBMIT_DELAY_MS,
                SUBMIT_DELAY_MS_BOUNDS,
            )),
            default_threshold: f64_with_bounds(
                "default_threshold",
                raw.default_threshold,
                DEFAULT_THRESHOLD,
                THRESHOLD_BOUNDS,
            ),
            default_root_margin,
            scroll_offset_px: f64_with_bounds(
                "scroll_offset_px",
                raw.scroll_offset_px,
                DEFAULT_SCROLL_OFFSET_PX,
                SCROLL_OFFSET_PX_BOUNDS,
            ),
            sections: raw.sections,
        })
    }

    pub fn section(&self, id: &str) -> Option<&SectionEntry> {
        self.sections.iter().find(|section| section.id == id)
    }
}

fn default_sections() -> Vec<SectionEntry> {
    [
        ("home", "Home", AnimationKind::FadeIn),
        ("about", "About", AnimationKind::FadeUp),
        ("projects", "Projects", AnimationKind::SlideLeft),
        ("skills", "Skills", AnimationKind::ZoomIn),
        ("contact", "Contact", AnimationKind::FadeUp),
    ]
    .into_iter()
    .map(|(id, label, animation)| SectionEntry {
        id: id.to_string(),
        label: label.to_string(),
        animation,
    })
    .collect()
}

fn u64_with_bounds(name: &str, value: Option<u64>, default: u64, bounds: (u64, u64)) -> u64 {
    match value {
        Some(value) if (bounds.0..=bounds.1).contains(&value) => value,
        Some(value) => {
            log::warn!("{name}={value} is outside {bounds:?}, using {default}");
            default
        }
        None => default,
    }
}

fn f64_with_bounds(name: &str, value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    match value {
        Some(value) if (bounds.0..=bounds.1).contains(&value) => value,
        Some(value) => {
            log::warn!("{name}={value} is outside {bounds:?}, using {default}");
            default
        }
        None => default,
    }
}

fn root_margin_or_default(value: Option<String>) -> String {
    match value {
        Some(value) => match value.trim().parse::<RootMargin>() {
            Ok(_) => value.trim().to_string(),
            Err(err) => {
                log::warn!(
                    "default_root_margin={value:?} is invalid ({err}), using {DEFAULT_ROOT_MARGIN:?}"
                );
                DEFAULT_ROOT_MARGIN.to_string()
            }
        },
        None => DEFAULT_ROOT_MARGIN.to_string(),
    }
}
