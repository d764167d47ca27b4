//! Forecast engine: trained model when available, seasonal baseline otherwise.

use chrono::{Duration, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tourism_domain::{Clock, DailyForecast, DateRange, ForecastRecord, Island, RecordFilter};
use tourism_persistence::{ArrivalRepository, ForecastRepository, RecordStore};

use crate::error::{ForecastError, Result};
use crate::heuristic::{BASELINE_MODEL, baseline_forecast};
use crate::model::{
    DEFAULT_MAX_STEPS, ForecastModel, ModelTrainer, MstlTrainer, PredictionInterval,
    TrainingSeries,
};
use crate::registry::ModelRegistry;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Values used for days a model cannot cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTriple {
    pub predicted: i64,
    pub lower: i64,
    pub upper: i64,
}

impl Default for FillTriple {
    fn default() -> Self {
        Self {
            predicted: 5000,
            lower: 4500,
            upper: 5500,
        }
    }
}

/// Forecast engine configuration.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Directory for model snapshots; models stay in memory when unset
    pub model_dir: Option<PathBuf>,
    /// Prediction interval level
    pub confidence_level: f64,
    /// Cap on extrapolated model steps
    pub max_model_steps: usize,
    /// Triple used to pad days past the model's reach
    pub short_series_fill: FillTriple,
    /// Baseline average when a location has no recent history
    pub default_trailing_average: f64,
    /// Window of the baseline's trailing average
    pub trailing_days: i64,
    /// Seed for the baseline jitter; entropy when unset
    pub jitter_seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            confidence_level: 0.95,
            max_model_steps: DEFAULT_MAX_STEPS,
            short_series_fill: FillTriple::default(),
            default_trailing_average: 5000.0,
            trailing_days: 30,
            jitter_seed: None,
        }
    }
}

// =============================================================================
// STRATEGY
// =============================================================================

/// How a forecast is produced, chosen once per call.
#[derive(Debug, Clone)]
pub enum ForecastStrategy {
    /// Fitted statistical model
    Trained(Arc<dyn ForecastModel>),
    /// Seasonal/weekday baseline around a trailing average
    Heuristic { trailing_average: f64 },
}

impl ForecastStrategy {
    pub fn model_name(&self) -> &str {
        match self {
            Self::Trained(model) => model.name(),
            Self::Heuristic { .. } => BASELINE_MODEL,
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Forecast engine over the record store and a model registry.
pub struct ForecastEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    registry: ModelRegistry,
    trainer: Arc<dyn ModelTrainer>,
    pub(crate) clock: Arc<dyn Clock>,
    config: ForecastConfig,
    rng: Mutex<StdRng>,
}

impl ForecastEngine {
    /// Engine with the default MSTL/AutoETS trainer.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, config: ForecastConfig) -> Self {
        let registry = config
            .model_dir
            .clone()
            .map_or_else(ModelRegistry::in_memory, ModelRegistry::with_dir);
        let rng = config
            .jitter_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let trainer: Arc<dyn ModelTrainer> = Arc::new(MstlTrainer {
            max_steps: config.max_model_steps,
        });

        Self {
            store,
            registry,
            trainer,
            clock,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Replace the model trainer.
    #[must_use]
    pub fn with_trainer(mut self, trainer: Arc<dyn ModelTrainer>) -> Self {
        self.trainer = trainer;
        self
    }

    pub const fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub const fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Daily forecasts for `today .. today + horizon_days - 1`.
    ///
    /// Every produced day is also appended to the forecast history; a failed
    /// write is logged and does not fail the call.
    pub async fn generate_forecast(
        &self,
        location: &str,
        horizon_days: usize,
    ) -> Result<Vec<DailyForecast>> {
        if horizon_days == 0 {
            return Ok(Vec::new());
        }

        let today = self.clock.today();
        let strategy = self.select_strategy(location).await?;

        let (forecast, model_name) = match &strategy {
            ForecastStrategy::Trained(model) => {
                match self.model_forecast(model, location, today, horizon_days).await {
                    Ok(days) => (days, strategy.model_name().to_string()),
                    Err(e) => {
                        tracing::warn!(location, error = %e, "Model prediction failed, using baseline");
                        let average = self.trailing_average(location).await?;
                        (
                            self.baseline(location, average, today, horizon_days),
                            BASELINE_MODEL.to_string(),
                        )
                    }
                }
            }
            ForecastStrategy::Heuristic { trailing_average } => (
                self.baseline(location, *trailing_average, today, horizon_days),
                BASELINE_MODEL.to_string(),
            ),
        };

        tracing::info!(
            location,
            horizon_days,
            model = %model_name,
            "Generated forecast"
        );
        self.record_history(&forecast, today, &model_name).await;
        Ok(forecast)
    }

    /// Pick the trained model for a location, restoring or training one if
    /// needed, else the baseline around the trailing average.
    pub async fn select_strategy(&self, location: &str) -> Result<ForecastStrategy> {
        if let Some(model) = self.registry.get(location) {
            return Ok(ForecastStrategy::Trained(model));
        }

        match self.registry.load_snapshot(location, self.trainer.as_ref()).await {
            Ok(Some(model)) => return Ok(ForecastStrategy::Trained(model)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(location, error = %e, "Could not restore model snapshot");
            }
        }

        match self.train_location(location).await {
            Ok(model) => Ok(ForecastStrategy::Trained(model)),
            Err(e) => {
                tracing::debug!(location, error = %e, "No model available, using baseline");
                let trailing_average = self.trailing_average(location).await?;
                Ok(ForecastStrategy::Heuristic { trailing_average })
            }
        }
    }

    /// Fit a model on the location's full daily history and register it.
    pub async fn train_location(&self, location: &str) -> Result<Arc<dyn ForecastModel>> {
        let history = self.store.daily_history(location).await?;
        let series = TrainingSeries::from_daily_totals(location, &history).ok_or(
            ForecastError::InsufficientData {
                needed: crate::model::MIN_DATA_POINTS,
                got: 0,
            },
        )?;

        let trainer = Arc::clone(&self.trainer);
        let training = series.clone();
        let model = tokio::task::spawn_blocking(move || trainer.fit(&training))
            .await
            .map_err(|e| ForecastError::Model(format!("training task failed: {e}")))??;

        self.registry.insert(location, Arc::clone(&model));
        if let Err(e) = self.registry.save_snapshot(&series).await {
            tracing::warn!(location, error = %e, "Failed to save model snapshot");
        }

        tracing::info!(location, points = series.len(), model = model.name(), "Trained forecast model");
        Ok(model)
    }

    /// Train a model for every island; returns the islands that trained.
    pub async fn train_all_models(&self) -> Vec<String> {
        let mut trained = Vec::new();
        for island in Island::ALL {
            match self.train_location(island.as_str()).await {
                Ok(_) => trained.push(island.as_str().to_string()),
                Err(e) => {
                    tracing::warn!(location = island.as_str(), error = %e, "Model training skipped");
                }
            }
        }
        trained
    }

    /// Regenerate forecasts for every island, returning days produced per
    /// island.
    pub async fn refresh_forecasts(&self, horizon_days: usize) -> Result<Vec<(String, usize)>> {
        let mut produced = Vec::with_capacity(Island::ALL.len());
        for island in Island::ALL {
            let days = self.generate_forecast(island.as_str(), horizon_days).await?;
            produced.push((island.as_str().to_string(), days.len()));
        }
        Ok(produced)
    }

    /// Mean per-record arrivals over the trailing window, or the configured
    /// default when there is none.
    pub async fn trailing_average(&self, location: &str) -> Result<f64> {
        let range = DateRange::trailing(self.clock.today(), self.config.trailing_days);
        let filter = RecordFilter::new(range).with_locations([location]);
        let average = self.store.average_count(&filter).await?;
        Ok(average.unwrap_or(self.config.default_trailing_average))
    }

    fn baseline(
        &self,
        location: &str,
        trailing_average: f64,
        start: NaiveDate,
        horizon_days: usize,
    ) -> Vec<DailyForecast> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        baseline_forecast(location, trailing_average, start, horizon_days, &mut *rng)
    }

    async fn model_forecast(
        &self,
        model: &Arc<dyn ForecastModel>,
        location: &str,
        today: NaiveDate,
        horizon_days: usize,
    ) -> Result<Vec<DailyForecast>> {
        // Step n predicts last_observed + n. Today is at least step 1.
        let lead = usize::try_from((today - model.last_observed()).num_days())
            .unwrap_or(0)
            .max(1);
        let steps = lead + horizon_days - 1;

        let predictor = Arc::clone(model);
        let level = self.config.confidence_level;
        let predicted = tokio::task::spawn_blocking(move || predictor.predict(steps, level))
            .await
            .map_err(|e| ForecastError::Model(format!("prediction task failed: {e}")))??;

        Ok(assemble_model_days(
            &predicted,
            lead,
            location,
            today,
            horizon_days,
            self.config.short_series_fill,
        ))
    }

    async fn record_history(&self, forecast: &[DailyForecast], issued: NaiveDate, model_name: &str) {
        let created_at = self.clock.now();
        let records: Vec<ForecastRecord> = forecast
            .iter()
            .map(|day| ForecastRecord::from_daily(day, issued, model_name, created_at))
            .collect();
        if let Err(e) = self.store.insert_forecasts(&records).await {
            tracing::warn!(error = %e, rows = records.len(), "Failed to record forecast history");
        }
    }
}

/// Map model steps onto calendar days starting at `today`, padding days past
/// the model output with the fill triple.
#[allow(clippy::cast_possible_truncation)]
fn assemble_model_days(
    predicted: &[PredictionInterval],
    lead: usize,
    location: &str,
    today: NaiveDate,
    horizon_days: usize,
    fill: FillTriple,
) -> Vec<DailyForecast> {
    (0..horizon_days)
        .map(|offset| {
            let date = today + Duration::days(i64::try_from(offset).unwrap_or(i64::MAX));
            match predicted.get(lead - 1 + offset) {
                Some(step) => DailyForecast::bounded(
                    date,
                    location,
                    step.point.max(0.0) as i64,
                    step.lower.max(0.0) as i64,
                    step.upper.max(0.0) as i64,
                ),
                None => DailyForecast::bounded(date, location, fill.predicted, fill.lower, fill.upper),
            }
        })
        .collect()
}
