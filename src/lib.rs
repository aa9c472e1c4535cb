pub mod config;
pub mod contact;
pub mod observer;
pub mod platform;
pub mod presets;
pub mod scroll;
pub mod section;
pub mod theme;
pub mod trigger;

#[cfg(target_arch = "wasm32")]
pub mod frontend;
