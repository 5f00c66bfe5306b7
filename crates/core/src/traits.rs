//! Collaborator traits consumed by the dialogue engine
//!
//! Implementations are constructed by the host and injected into the
//! dialogue manager. The engine never reaches for process-wide singletons.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::LeadRecord;

/// Transcription output
#[derive(Debug, Clone)]
pub struct TranscriptResult {
    pub text: String,
    /// Recognizer confidence in [0, 1]
    pub confidence: f32,
}

/// Speech recognition collaborator.
///
/// The engine treats any returned text as valid input; empty text is
/// handled the same as a low-confidence match, so implementations may
/// return an empty transcript rather than an error for silence.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<TranscriptResult>;
}

/// Durable storage collaborator for finished sessions.
///
/// The engine depends only on the record's field names, not on the sink's
/// schema. Failures are the sink's to report; the dialogue has already
/// closed by the time a record is written.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn record(&self, lead: &LeadRecord) -> Result<()>;
}
