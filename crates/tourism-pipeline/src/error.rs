//! Pipeline error types

use thiserror::Error;
use tourism_forecast::ForecastError;
use tourism_persistence::PersistenceError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] PersistenceError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
