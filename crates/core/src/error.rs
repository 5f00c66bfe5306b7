//! Error types shared across the workspace

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Session lookup or lifecycle misuse
    #[error("session error: {0}")]
    Session(String),

    /// Collected data failed validation at a state-machine boundary
    #[error("invalid slot data: {0}")]
    InvalidSlot(String),

    /// Serialization failure for snapshots or lead records
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure writing a lead record to a sink
    #[error("lead sink error: {0}")]
    Sink(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
