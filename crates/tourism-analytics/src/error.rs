//! Analytics error types.

use thiserror::Error;
use tourism_domain::DomainError;
use tourism_persistence::PersistenceError;

/// Analytics errors.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Record store failure; no partial results are returned
    #[error("Analytics query failed: {0}")]
    Store(#[from] PersistenceError),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Result could not be encoded for the cache
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DomainError> for AnalyticsError {
    fn from(err: DomainError) -> Self {
        Self::InvalidParameter(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
