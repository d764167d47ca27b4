//! Forecast error types.

use thiserror::Error;
use tourism_persistence::PersistenceError;

/// Forecast errors.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Not enough daily history to fit a model
    #[error("Insufficient data: need at least {needed} days, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model fitting or prediction failed
    #[error("Forecast model error: {0}")]
    Model(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[from] PersistenceError),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(err.to_string())
    }
}

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;
