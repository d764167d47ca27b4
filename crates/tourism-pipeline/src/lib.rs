//! # Tourism Pipeline
//!
//! Batch jobs around the record store.
//!
//! ## Jobs
//!
//! - **seed**: Synthetic arrivals, occupancy and economic indicators
//! - **daily**: Regenerate forecasts for every island
//! - **train**: Fit forecast models on the full history
//! - **export**: Write the forecast history to Parquet

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod generator;
pub mod jobs;

pub use error::{PipelineError, Result};
pub use generator::{GeneratorConfig, SyntheticDataset, SyntheticGenerator};
pub use jobs::{DAILY_HORIZON_DAYS, Pipeline, SeedReport};
