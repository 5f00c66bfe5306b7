//! Dialogue manager output type

use serde::{Deserialize, Serialize};

use lead_agent_core::CollectedData;

use crate::flow::Stage;

/// One system response per user utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueResponse {
    /// What to speak or display
    pub speech: String,
    pub next_stage: Stage,
    /// Suggested answers for UI affordances
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// When true, `next_stage` is terminal and no further turns are
    /// expected to mutate state
    pub is_complete: bool,
    /// Snapshot of collected slots, echoed on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CollectedData>,
    /// Confidence of the transition decision
    pub confidence: f32,
    /// Set only on the error terminal: escalate to a human operator
    #[serde(default)]
    pub needs_human: bool,
}

impl DialogueResponse {
    pub fn ask(speech: impl Into<String>, next_stage: Stage, confidence: f32) -> Self {
        Self {
            speech: speech.into(),
            next_stage,
            options: None,
            is_complete: false,
            data: None,
            confidence,
            needs_human: false,
        }
    }

    pub fn with_options(mut self, options: Option<Vec<String>>) -> Self {
        self.options = options;
        self
    }

    /// Closing response on a terminal stage
    pub fn closing(
        speech: impl Into<String>,
        next_stage: Stage,
        data: CollectedData,
        confidence: f32,
    ) -> Self {
        Self {
            speech: speech.into(),
            next_stage,
            options: None,
            is_complete: true,
            data: Some(data),
            confidence,
            needs_human: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_marks_complete_with_snapshot() {
        let response = DialogueResponse::closing(
            "bye",
            Stage::ThankYou,
            CollectedData::default(),
            1.0,
        );
        assert!(response.is_complete);
        assert!(response.next_stage.is_terminal());
        assert!(response.data.is_some());
    }

    #[test]
    fn ask_is_not_complete() {
        let response = DialogueResponse::ask("which city?", Stage::Location, 0.3);
        assert!(!response.is_complete);
        assert!(response.data.is_none());
    }
}
