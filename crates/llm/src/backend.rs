//! LLM backend implementations
//!
//! A single non-streaming chat completion is all the dialogue needs; each
//! call carries a bounded timeout so a slow model can never stall a turn.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lead_agent_config::LlmSettings;

use crate::LlmError;

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "qwen3:4b-instruct-2507-q4_K_M".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            max_tokens: 256,
            temperature: 0.2,
            timeout: Duration::from_secs(8),
        }
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

/// LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a single completion for the given messages
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Check if the model is reachable
    async fn is_available(&self) -> bool;

    /// Model name
    fn model_name(&self) -> &str;
}

/// Ollama chat backend
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = OllamaChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                num_predict: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.config.endpoint))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Generation(format!(
                "ollama returned {}",
                response.status()
            )));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(body.message.content)
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.config.endpoint))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_settings() {
        let mut settings = LlmSettings::default();
        settings.model = "phi3".to_string();
        settings.timeout_ms = 1_500;

        let config = LlmConfig::from(&settings);
        assert_eq!(config.model, "phi3");
        assert_eq!(config.timeout, Duration::from_millis(1_500));
    }

    #[test]
    fn chat_request_serializes_to_ollama_shape() {
        let messages = vec![Message::user("hello")];
        let request = OllamaChatRequest {
            model: "phi3",
            messages: &messages,
            stream: false,
            options: OllamaOptions { num_predict: 64, temperature: 0.2 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "phi3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["options"]["num_predict"], 64);
    }
}
