//! # Tourism Forecast
//!
//! Day-indexed visitor arrival forecasts with confidence bounds.
//!
//! ```text
//!   generate_forecast(location, horizon)
//!              │
//!              ▼
//!   registry hit? ── snapshot on disk? ── train on demand?
//!              │ yes                              │ no
//!              ▼                                  ▼
//!   ForecastStrategy::Trained          ForecastStrategy::Heuristic
//!   (MSTL / AutoETS via augurs,         (trailing average × season
//!    padded with the fill triple)        × weekend × jitter)
//!              │                                  │
//!              └──────────────┬───────────────────┘
//!                             ▼
//!            0 ≤ lower ≤ predicted ≤ upper, recorded as history
//! ```
//!
//! Business impact estimates and previews are derived from these forecasts.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod heuristic;
pub mod impact;
pub mod model;
pub mod registry;

pub use engine::{FillTriple, ForecastConfig, ForecastEngine, ForecastStrategy};
pub use error::{ForecastError, Result};
pub use impact::{BusinessImpact, ForecastPreview};
pub use model::{AugursModel, ForecastModel, ModelTrainer, MstlTrainer, PredictionInterval, TrainingSeries};
pub use registry::ModelRegistry;
