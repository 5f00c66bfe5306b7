//! Flat lead record handed to the persistence collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::{ChannelMode, Turn};
use crate::qualification::QualificationDecision;
use crate::slots::CollectedData;

/// Everything downstream systems need about a finished session.
///
/// Field names are part of the contract with the sink; keep them stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub session_id: String,
    pub channel: ChannelMode,
    pub data: CollectedData,
    pub search_count: u32,
    pub decision: QualificationDecision,
    pub transcript: Vec<Turn>,
    pub created_at: DateTime<Utc>,
}
