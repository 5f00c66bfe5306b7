//! LLM integration for the lead qualification agent
//!
//! Two escalation modes sit behind the [`ExtractionAdapter`]:
//! - interpreting a single unclear answer against an expected slot
//! - extracting a structured requirement map from information-dense input
//!
//! Both degrade to "no extraction" on any backend failure. Retry behavior
//! is an injected [`RetryPolicy`], not something baked into the backend.

pub mod adapter;
pub mod backend;
pub mod retry;

pub use adapter::{ExtractedRequirements, ExtractionAdapter};
pub use backend::{LlmBackend, LlmConfig, Message, OllamaBackend, Role};
pub use retry::RetryPolicy;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for lead_agent_core::Error {
    fn from(err: LlmError) -> Self {
        lead_agent_core::Error::Other(err.to_string())
    }
}
