//! Configuration management for the lead qualification agent
//!
//! Supports loading configuration from:
//! - TOML files (`config/default.toml`, then `config/{env}.toml`)
//! - Environment variables (`LEAD_AGENT_` prefix, `__` separator)
//!
//! All sections default to sensible values so the engine runs with no
//! config file at all.

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    load_settings, DialogueConfig, LlmSettings, RuntimeEnvironment, SearchSettings, Settings,
};
