//! LLM extraction adapter
//!
//! Wraps a backend with the two escalation operations the dialogue
//! manager uses. Failures never cross this boundary: a timeout, transport
//! error, or malformed completion degrades to "no extraction" with a log
//! line, and the dialogue continues on its deterministic path.

use std::sync::Arc;

use serde::Deserialize;

use crate::backend::{LlmBackend, Message};
use crate::retry::RetryPolicy;
use crate::LlmError;

/// Sentinel the model is told to emit when it cannot interpret the input
const UNCLEAR_SENTINEL: &str = "UNCLEAR";

/// Partial requirement map extracted from information-dense input.
///
/// The key set is fixed; unknown keys in the model output are ignored and
/// null/empty values are filtered to `None` before anything is merged
/// into a session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractedRequirements {
    pub location: Option<String>,
    pub property_category: Option<String>,
    pub property_type: Option<String>,
    pub bedroom: Option<String>,
    pub budget: Option<String>,
    pub name: Option<String>,
    pub timeline: Option<String>,
    pub purpose: Option<String>,
}

impl ExtractedRequirements {
    fn drop_empty(field: &mut Option<String>) {
        if field.as_deref().map(str::trim).map_or(false, str::is_empty) {
            *field = None;
        }
    }

    fn cleaned(mut self) -> Self {
        Self::drop_empty(&mut self.location);
        Self::drop_empty(&mut self.property_category);
        Self::drop_empty(&mut self.property_type);
        Self::drop_empty(&mut self.bedroom);
        Self::drop_empty(&mut self.budget);
        Self::drop_empty(&mut self.name);
        Self::drop_empty(&mut self.timeline);
        Self::drop_empty(&mut self.purpose);
        self
    }

    /// Number of populated fields
    pub fn filled_count(&self) -> usize {
        [
            self.location.is_some(),
            self.property_category.is_some(),
            self.property_type.is_some(),
            self.bedroom.is_some(),
            self.budget.is_some(),
            self.name.is_some(),
            self.timeline.is_some(),
            self.purpose.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }
}

/// Pull a JSON payload out of a completion that may be wrapped in
/// markdown code fences or surrounding prose.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(rest) = text.split_once("```json").map(|(_, r)| r) {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some(rest) = text.split_once("```").map(|(_, r)| r) {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    text
}

/// Escalation adapter over an LLM backend
pub struct ExtractionAdapter {
    backend: Arc<dyn LlmBackend>,
    policy: RetryPolicy,
}

impl ExtractionAdapter {
    pub fn new(backend: Arc<dyn LlmBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    async fn generate_with_retry(&self, messages: &[Message]) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.backend.generate(messages).await {
                Ok(text) => return Ok(text),
                Err(err) => match self.policy.backoff_after(attempt) {
                    Some(delay) => {
                        tracing::debug!(attempt, error = %err, "llm attempt failed, retrying");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// Interpret a garbled or ambiguous answer against the expected slot.
    ///
    /// Returns the model's best reading, or `None` when the model signals
    /// the sentinel or anything at all goes wrong.
    pub async fn interpret_unclear(&self, utterance: &str, expected: &str) -> Option<String> {
        if utterance.trim().is_empty() {
            return None;
        }

        let prompt = format!(
            "You are helping interpret a voice transcription from a phone call.\n\
             The transcription might have accents or mispronunciations.\n\n\
             Expected type of answer: {expected}\n\
             Transcription: \"{utterance}\"\n\n\
             What did the user most likely mean? Give just the interpreted value, nothing else.\n\
             If you can't determine, say \"{UNCLEAR_SENTINEL}\".\n\n\
             Examples:\n\
             - \"noyda\" for city -> Noida\n\
             - \"too bhk\" for bedrooms -> 2 BHK\n\
             - \"yess please\" for yes/no -> yes\n\n\
             Your interpretation:"
        );

        match self.generate_with_retry(&[Message::user(prompt)]).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() || text.to_uppercase().contains(UNCLEAR_SENTINEL) {
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "interpretation call failed");
                None
            }
        }
    }

    /// Extract a structured requirement map from information-dense input.
    ///
    /// Any failure, including the model wrapping the JSON in prose or
    /// fences it then mangles, yields an empty map.
    pub async fn extract_requirements(&self, utterance: &str) -> ExtractedRequirements {
        if utterance.trim().len() < 5 {
            return ExtractedRequirements::default();
        }

        let prompt = format!(
            "Extract property search requirements from this customer statement.\n\
             Return ONLY a JSON object with these fields (use null for missing info):\n\n\
             Fields to extract:\n\
             - location: City name in India (e.g., Noida, Mumbai, Delhi, Bangalore)\n\
             - property_category: \"Residential\" or \"Commercial\"\n\
             - property_type: Apartment/Flat, Villa/House, Plot, Office, Shop, etc.\n\
             - bedroom: Number of bedrooms (e.g., \"2 BHK\", \"3 BHK\")\n\
             - budget: Budget amount (e.g., \"50 Lakhs\", \"1 Crore\", \"80 Lakhs to 1 Crore\")\n\
             - name: Customer's name if they mentioned it\n\
             - timeline: When they want to buy (e.g., \"immediately\", \"3 months\")\n\
             - purpose: \"investment\", \"self-use\", \"rental\", etc.\n\n\
             Customer said: \"{utterance}\"\n\n\
             Return ONLY valid JSON, no other text:"
        );

        let text = match self.generate_with_retry(&[Message::user(prompt)]).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "requirement extraction call failed");
                return ExtractedRequirements::default();
            }
        };

        let payload = strip_code_fences(&text);
        match serde_json::from_str::<ExtractedRequirements>(payload) {
            Ok(extracted) => extracted.cleaned(),
            Err(err) => {
                tracing::debug!(error = %err, "requirement extraction returned non-JSON");
                ExtractedRequirements::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Backend that replays scripted responses
    struct MockBackend {
        responses: Mutex<Vec<Result<String, LlmError>>>,
        calls: Mutex<u32>,
    }

    impl MockBackend {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn generate(&self, _messages: &[Message]) -> Result<String, LlmError> {
            *self.calls.lock() += 1;
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                Err(LlmError::Generation("script exhausted".into()))
            } else {
                responses.remove(0)
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    fn adapter_with(responses: Vec<Result<String, LlmError>>) -> ExtractionAdapter {
        ExtractionAdapter::new(Arc::new(MockBackend::new(responses)), RetryPolicy::none())
    }

    #[tokio::test]
    async fn interpret_returns_model_reading() {
        let adapter = adapter_with(vec![Ok("Noida".to_string())]);
        assert_eq!(
            adapter.interpret_unclear("noyda", "city name").await,
            Some("Noida".to_string())
        );
    }

    #[tokio::test]
    async fn interpret_sentinel_is_none() {
        let adapter = adapter_with(vec![Ok("UNCLEAR".to_string())]);
        assert_eq!(adapter.interpret_unclear("mumble", "city name").await, None);
    }

    #[tokio::test]
    async fn interpret_backend_failure_is_none() {
        let adapter = adapter_with(vec![Err(LlmError::Timeout)]);
        assert_eq!(adapter.interpret_unclear("noyda", "city name").await, None);
    }

    #[tokio::test]
    async fn interpret_empty_input_skips_the_call() {
        let backend = Arc::new(MockBackend::new(vec![Ok("x".into())]));
        let adapter = ExtractionAdapter::new(backend.clone(), RetryPolicy::none());
        assert_eq!(adapter.interpret_unclear("   ", "city name").await, None);
        assert_eq!(*backend.calls.lock(), 0);
    }

    #[tokio::test]
    async fn retry_policy_consumes_failures_before_success() {
        let backend = Arc::new(MockBackend::new(vec![
            Err(LlmError::Timeout),
            Ok("Noida".to_string()),
        ]));
        let adapter = ExtractionAdapter::new(
            backend.clone(),
            RetryPolicy::new(2, std::time::Duration::ZERO),
        );
        assert_eq!(
            adapter.interpret_unclear("noyda", "city name").await,
            Some("Noida".to_string())
        );
        assert_eq!(*backend.calls.lock(), 2);
    }

    #[tokio::test]
    async fn extract_parses_fenced_json() {
        let adapter = adapter_with(vec![Ok(
            "Here you go:\n```json\n{\"location\": \"Noida\", \"bedroom\": \"3 BHK\", \
             \"budget\": \"50 Lakhs\", \"name\": \"\"}\n```"
                .to_string(),
        )]);
        let extracted = adapter
            .extract_requirements("I want a 3 BHK in Noida under 50 lakhs")
            .await;
        assert_eq!(extracted.location.as_deref(), Some("Noida"));
        assert_eq!(extracted.bedroom.as_deref(), Some("3 BHK"));
        // Empty strings are filtered, not kept
        assert_eq!(extracted.name, None);
        assert_eq!(extracted.filled_count(), 3);
    }

    #[tokio::test]
    async fn extract_prose_yields_empty_map() {
        let adapter = adapter_with(vec![Ok(
            "Sure! The customer wants a flat in Noida.".to_string()
        )]);
        let extracted = adapter
            .extract_requirements("I want a 3 BHK in Noida under 50 lakhs")
            .await;
        assert!(extracted.is_empty());
    }

    #[tokio::test]
    async fn extract_short_input_skips_the_call() {
        let backend = Arc::new(MockBackend::new(vec![Ok("{}".into())]));
        let adapter = ExtractionAdapter::new(backend.clone(), RetryPolicy::none());
        let extracted = adapter.extract_requirements("hi").await;
        assert!(extracted.is_empty());
        assert_eq!(*backend.calls.lock(), 0);
    }

    #[test]
    fn fence_stripping_variants() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }
}
