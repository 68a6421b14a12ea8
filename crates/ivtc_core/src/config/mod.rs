//! Configuration management.
//!
//! This module provides:
//! - TOML-based user settings split into `[paths]`, `[logging]`,
//!   `[guessing]` and `[script]` tables
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only the changed table is rewritten)
//!
//! # Example
//!
//! ```no_run
//! use ivtc_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Minimum section length: {}", config.settings().guessing.minimum_length);
//!
//! config.settings_mut().script.prefer_select_every = true;
//! config.update_section(ConfigSection::Script).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, GuessingSettings, LoggingSettings, PathSettings, ScriptSettings, Settings,
};
