//! Search query and outcome types

use serde::{Deserialize, Serialize};

use lead_agent_core::PropertyCategory;

/// What to search for, assembled from collected slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub location: String,
    pub category: PropertyCategory,
    /// Subtype within the category ("Villas", "Office Space", ...)
    pub property_type: Option<String>,
    /// "N BHK" or "Studio"; residential only
    pub bedroom: Option<String>,
}

/// One listing from the search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyHit {
    pub title: String,
    pub price: Option<String>,
    pub location: Option<String>,
}

/// Search result as the dialogue consumes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub count: u32,
    /// At most the first few listings; the dialogue speaks up to two
    pub top_results: Vec<PropertyHit>,
    pub success: bool,
    pub error: Option<String>,
    pub source_url: String,
}

impl SearchOutcome {
    /// Failed outcome carrying the reason, zero matches
    pub fn failure(error: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            count: 0,
            top_results: Vec::new(),
            success: false,
            error: Some(error.into()),
            source_url: source_url.into(),
        }
    }
}
