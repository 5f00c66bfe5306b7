//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Dialogue engine knobs
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// LLM backend configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Property search configuration
    #[serde(default)]
    pub search: SearchSettings,
}

/// Dialogue engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Retries allowed per stage before the default/accept path kicks in
    #[serde(default = "default_max_retries")]
    pub max_retries_per_stage: u32,

    /// Word count above which an utterance is treated as information-dense
    #[serde(default = "default_rich_word_count")]
    pub rich_input_word_count: usize,

    /// Domain keyword hits at or above which an utterance is
    /// information-dense regardless of length
    #[serde(default = "default_rich_keyword_hits")]
    pub rich_input_keyword_hits: usize,

    /// Extracted slots required for the rich-input shortcut to jump to
    /// verification
    #[serde(default = "default_rich_min_slots")]
    pub rich_input_min_slots: usize,
}

fn default_max_retries() -> u32 {
    2
}

fn default_rich_word_count() -> usize {
    10
}

fn default_rich_keyword_hits() -> usize {
    2
}

fn default_rich_min_slots() -> usize {
    2
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_retries_per_stage: default_max_retries(),
            rich_input_word_count: default_rich_word_count(),
            rich_input_keyword_hits: default_rich_keyword_hits(),
            rich_input_min_slots: default_rich_min_slots(),
        }
    }
}

/// LLM backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Attempts for transient failures (1 = no retry)
    #[serde(default = "default_llm_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff in milliseconds, doubled each retry
    #[serde(default = "default_llm_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_llm_endpoint() -> String {
    std::env::var("OLLAMA_ENDPOINT").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_llm_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "qwen3:4b-instruct-2507-q4_K_M".to_string())
}

fn default_llm_timeout_ms() -> u64 {
    8_000
}

fn default_llm_max_tokens() -> usize {
    256
}

fn default_llm_temperature() -> f32 {
    0.2
}

fn default_llm_max_attempts() -> u32 {
    2
}

fn default_llm_initial_backoff_ms() -> u64 {
    100
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            timeout_ms: default_llm_timeout_ms(),
            max_tokens: default_llm_max_tokens(),
            temperature: default_llm_temperature(),
            max_attempts: default_llm_max_attempts(),
            initial_backoff_ms: default_llm_initial_backoff_ms(),
        }
    }
}

/// Property search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_search_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_search_base_url() -> String {
    std::env::var("SEARCH_BASE_URL")
        .unwrap_or_else(|_| "https://www.squareyards.com".to_string())
}

fn default_search_timeout_ms() -> u64 {
    10_000
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            timeout_ms: default_search_timeout_ms(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_ms".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        if self.llm.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_attempts".to_string(),
                message: "at least one attempt is required".to_string(),
            });
        }
        if self.search.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.timeout_ms".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: "temperature must be in [0, 2]".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings, layered: defaults <- config files <- environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("LEAD_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.dialogue.max_retries_per_stage, 2);
        assert_eq!(settings.dialogue.rich_input_word_count, 10);
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.llm.timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn settings_deserialize_from_toml_fragment() {
        let toml = r#"
            environment = "production"

            [dialogue]
            max_retries_per_stage = 3
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.dialogue.max_retries_per_stage, 3);
        // Untouched sections keep defaults
        assert_eq!(settings.llm.max_attempts, 2);
    }
}
