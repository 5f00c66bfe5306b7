//! Core traits and types for the lead qualification agent
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation types (turns, channel modes)
//! - Collected slot data with per-slot confidence
//! - Qualification decision types
//! - Lead record for downstream persistence
//! - Collaborator traits (speech-to-text, lead sink)
//! - Error types

pub mod conversation;
pub mod error;
pub mod qualification;
pub mod record;
pub mod slots;
pub mod traits;

pub use conversation::{ChannelMode, Turn, TurnRole};
pub use error::{Error, Result};
pub use qualification::{QualificationDecision, QualificationStatus};
pub use record::LeadRecord;
pub use slots::{BudgetValue, CollectedData, PropertyCategory, SlotValue};
pub use traits::{LeadSink, SpeechToText, TranscriptResult};
