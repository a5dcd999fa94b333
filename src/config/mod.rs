//! Invocation settings
//!
//! Everything the coordinator needs from its environment is resolved here,
//! once, into a [`Settings`] value that is passed explicitly to the engine.

pub mod loader;
pub mod types;

pub use loader::{EnvSnapshot, SettingsLoader, CONFIG_ENV, HOOK_TIMEOUT_ENV};
pub use types::{Settings, SettingsFile, DEFAULT_TRUTH_DIR};
