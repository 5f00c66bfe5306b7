//! Qualification decision types
//!
//! The decision itself is computed by the agent crate; these types are
//! shared so lead records can embed the outcome.

use serde::{Deserialize, Serialize};

/// Overall lead status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationStatus {
    Qualified,
    NotQualified,
}

/// Outcome of the post-collection qualification checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationDecision {
    /// Property search returned at least one match
    pub property_count_check: bool,
    /// Caller agreed to be contacted by sales
    pub consent_check: bool,
    /// Budget text parsed to a numeric range
    pub budget_parsed_check: bool,
    /// Human-readable rationale naming every failing check
    pub summary: String,
    pub status: QualificationStatus,
}

impl QualificationDecision {
    pub fn is_qualified(&self) -> bool {
        self.status == QualificationStatus::Qualified
    }
}
