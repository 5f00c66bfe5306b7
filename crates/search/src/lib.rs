//! Property inventory search collaborator
//!
//! The dialogue only consumes the match count, the success flag, and up
//! to two result titles for its spoken summary. Search failures are
//! encoded in the outcome, never raised: a dead listing site must not
//! break a conversation.

pub mod searcher;
pub mod types;
pub mod url;

pub use searcher::{FixedSearcher, HttpPropertySearcher, PropertySearcher};
pub use types::{PropertyHit, SearchOutcome, SearchQuery};
pub use url::build_search_url;

use thiserror::Error;

/// Search errors, surfaced only through `SearchOutcome::error`
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Unparseable listing page: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Network(err.to_string())
        }
    }
}
