//! Batch jobs over a DuckDB store.

use std::path::PathBuf;
use std::sync::Arc;

use tourism_domain::Clock;
use tourism_forecast::{ForecastConfig, ForecastEngine};
use tourism_persistence::{
    ArrivalRepository, DuckDbStore, EconomicRepository, OccupancyRepository,
};

use crate::error::{PipelineError, Result};
use crate::generator::SyntheticDataset;

/// Horizon of the daily forecast refresh
pub const DAILY_HORIZON_DAYS: usize = 90;

/// Rows written by a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub arrivals: usize,
    pub occupancy: usize,
    pub indicators: usize,
}

/// Store plus forecast engine shared by all jobs.
pub struct Pipeline {
    store: Arc<DuckDbStore>,
    forecast: ForecastEngine,
}

impl Pipeline {
    pub fn new(store: Arc<DuckDbStore>, clock: Arc<dyn Clock>, config: ForecastConfig) -> Self {
        let forecast = ForecastEngine::new(store.clone(), clock, config);
        Self { store, forecast }
    }

    pub const fn forecast(&self) -> &ForecastEngine {
        &self.forecast
    }

    /// Append a generated dataset to the store.
    pub async fn seed(&self, dataset: &SyntheticDataset) -> Result<SeedReport> {
        let report = SeedReport {
            arrivals: self.store.insert_arrivals(&dataset.arrivals).await?,
            occupancy: self.store.insert_occupancy(&dataset.occupancy).await?,
            indicators: self.store.insert_indicators(&dataset.indicators).await?,
        };

        tracing::info!(
            arrivals = report.arrivals,
            occupancy = report.occupancy,
            indicators = report.indicators,
            "Seeded store"
        );
        Ok(report)
    }

    /// Regenerate forecasts for every island; returns days written per island.
    pub async fn run_daily(&self, horizon_days: usize) -> Result<Vec<(String, usize)>> {
        let produced = self.forecast.refresh_forecasts(horizon_days).await?;
        for (location, days) in &produced {
            tracing::info!(location = %location, days, "Refreshed forecast");
        }
        Ok(produced)
    }

    /// Train a model per island; returns the islands that trained.
    pub async fn train(&self) -> Vec<String> {
        let trained = self.forecast.train_all_models().await;
        tracing::info!(trained = ?trained, "Training finished");
        trained
    }

    /// Write the forecast history to a Parquet file.
    pub async fn export(&self, output: PathBuf) -> Result<PathBuf> {
        let store = Arc::clone(&self.store);
        let target = output.clone();
        tokio::task::spawn_blocking(move || store.export_forecasts_to_parquet(&target))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        tracing::info!(path = %output.display(), "Exported forecast history");
        Ok(output)
    }
}
