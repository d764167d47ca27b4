//! Statistical forecasting models.
//!
//! A model is fitted on a gap-filled daily arrival series. The default
//! trainer uses MSTL with weekly seasonality over an AutoETS trend once two
//! full weeks are available, and plain AutoETS below that.

use augurs::{
    Fit,
    ets::AutoETS,
    forecaster::{Forecaster, Transformer, transforms::LinearInterpolator},
    mstl::MSTLModel,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use tourism_persistence::DailyTotal;

use crate::error::{ForecastError, Result};

/// Minimum number of daily points required to fit any model
pub const MIN_DATA_POINTS: usize = 7;

/// Minimum daily points for seasonal (MSTL) fitting
pub const MIN_SEASONAL_DATA_POINTS: usize = 14;

/// Weekly seasonality period (days)
const WEEKLY_PERIOD: usize = 7;

/// Default cap on extrapolated steps
pub const DEFAULT_MAX_STEPS: usize = 730;

// =============================================================================
// TRAINING SERIES
// =============================================================================

/// Contiguous daily arrival totals for one location.
///
/// This is also the persisted model snapshot. A model is restored by
/// refitting its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSeries {
    pub location: String,
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl TrainingSeries {
    /// Build a series from daily totals, filling missing days with zero.
    /// Returns `None` for an empty history.
    pub fn from_daily_totals(location: impl Into<String>, history: &[DailyTotal]) -> Option<Self> {
        let start = history.iter().map(|d| d.date).min()?;
        let end = history.iter().map(|d| d.date).max()?;

        let by_date: HashMap<NaiveDate, i64> = history
            .iter()
            .fold(HashMap::new(), |mut acc, d| {
                *acc.entry(d.date).or_insert(0) += d.arrivals;
                acc
            });

        let days = usize::try_from((end - start).num_days() + 1).ok()?;
        #[allow(clippy::cast_precision_loss)]
        let values = (0..days)
            .map(|offset| {
                let date = start + Duration::days(i64::try_from(offset).unwrap_or(0));
                by_date.get(&date).copied().unwrap_or(0) as f64
            })
            .collect();

        Some(Self {
            location: location.into(),
            start,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Date of the last observation.
    pub fn last_date(&self) -> NaiveDate {
        let span = i64::try_from(self.values.len().saturating_sub(1)).unwrap_or(0);
        self.start + Duration::days(span)
    }
}

// =============================================================================
// MODEL TRAITS
// =============================================================================

/// One predicted step with its interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionInterval {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A fitted forecasting model.
pub trait ForecastModel: Send + Sync + Debug {
    /// Name recorded with generated forecasts
    fn name(&self) -> &str;

    /// Date of the last observation the model was fitted on; step 1 of a
    /// prediction is the day after
    fn last_observed(&self) -> NaiveDate;

    /// Predict up to `steps` days ahead at the given interval level. May
    /// return fewer steps than requested.
    fn predict(&self, steps: usize, level: f64) -> Result<Vec<PredictionInterval>>;

    /// Series needed to restore this model
    fn snapshot(&self) -> &TrainingSeries;
}

/// Fits models on daily series.
pub trait ModelTrainer: Send + Sync {
    fn fit(&self, series: &TrainingSeries) -> Result<Arc<dyn ForecastModel>>;
}

// =============================================================================
// AUGURS IMPLEMENTATION
// =============================================================================

/// MSTL/AutoETS trainer backed by augurs.
#[derive(Debug, Clone, Copy)]
pub struct MstlTrainer {
    /// Cap on extrapolated steps per prediction
    pub max_steps: usize,
}

impl Default for MstlTrainer {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl ModelTrainer for MstlTrainer {
    fn fit(&self, series: &TrainingSeries) -> Result<Arc<dyn ForecastModel>> {
        if series.len() < MIN_DATA_POINTS {
            return Err(ForecastError::InsufficientData {
                needed: MIN_DATA_POINTS,
                got: series.len(),
            });
        }

        let seasonal = series.len() >= MIN_SEASONAL_DATA_POINTS;
        let values = series.values.as_slice();
        let forecaster: Box<dyn FittedForecaster> = if seasonal {
            let ets = AutoETS::non_seasonal().into_trend_model();
            let mstl = MSTLModel::new(vec![WEEKLY_PERIOD], ets);
            let mut forecaster = Forecaster::new(mstl).with_transformers(interpolator());
            forecaster
                .fit(values)
                .map_err(|e| ForecastError::Model(format!("MSTL fit error: {e}")))?;
            Box::new(forecaster)
        } else {
            let mut forecaster =
                Forecaster::new(AutoETS::non_seasonal()).with_transformers(interpolator());
            forecaster
                .fit(values)
                .map_err(|e| ForecastError::Model(format!("ETS fit error: {e}")))?;
            Box::new(forecaster)
        };

        let model = AugursModel {
            series: series.clone(),
            seasonal,
            max_steps: self.max_steps,
            forecaster: Mutex::new(forecaster),
        };

        tracing::debug!(
            location = %series.location,
            points = series.len(),
            model = model.name(),
            "Fitted forecast model"
        );
        Ok(Arc::new(model))
    }
}

/// A fitted augurs forecaster, erased over its model type.
trait FittedForecaster: Send {
    fn forecast_ahead(&mut self, horizon: usize, level: f64) -> Result<augurs::Forecast>;
}

impl<M> FittedForecaster for Forecaster<M>
where
    M: Fit + Send,
    M::Fitted: Send,
{
    fn forecast_ahead(&mut self, horizon: usize, level: f64) -> Result<augurs::Forecast> {
        self.predict(horizon, level)
            .map_err(|e| ForecastError::Model(format!("predict error: {e}")))
    }
}

/// Fitted augurs model together with the series it was fitted on.
pub struct AugursModel {
    series: TrainingSeries,
    seasonal: bool,
    max_steps: usize,
    forecaster: Mutex<Box<dyn FittedForecaster>>,
}

impl Debug for AugursModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AugursModel")
            .field("location", &self.series.location)
            .field("points", &self.series.len())
            .field("seasonal", &self.seasonal)
            .field("max_steps", &self.max_steps)
            .finish_non_exhaustive()
    }
}

fn interpolator() -> Vec<Box<dyn Transformer>> {
    vec![Box::new(LinearInterpolator::default())]
}

impl AugursModel {
    fn forecast(&self, horizon: usize, level: f64) -> Result<augurs::Forecast> {
        self.forecaster
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .forecast_ahead(horizon, level)
    }

    /// Symmetric normal interval around each point when the model reports
    /// none, using the spread of the training series.
    fn normal_intervals(&self, points: &[f64], level: f64) -> Result<Vec<PredictionInterval>> {
        use statrs::statistics::Statistics;

        let spread = self.series.values.iter().std_dev();
        let spread = if spread.is_finite() { spread } else { 0.0 };
        let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Model(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + level / 2.0);

        Ok(points
            .iter()
            .map(|&point| PredictionInterval {
                point,
                lower: point - z * spread,
                upper: point + z * spread,
            })
            .collect())
    }
}

impl ForecastModel for AugursModel {
    fn name(&self) -> &str {
        if self.seasonal { "mstl" } else { "ets" }
    }

    fn last_observed(&self) -> NaiveDate {
        self.series.last_date()
    }

    fn predict(&self, steps: usize, level: f64) -> Result<Vec<PredictionInterval>> {
        let steps = steps.min(self.max_steps);
        if steps == 0 {
            return Ok(Vec::new());
        }

        let forecast = self.forecast(steps, level)?;
        match forecast.intervals {
            Some(intervals) => Ok(forecast
                .point
                .iter()
                .zip(intervals.lower.iter().zip(intervals.upper.iter()))
                .map(|(&point, (&lower, &upper))| PredictionInterval { point, lower, upper })
                .collect()),
            None => self.normal_intervals(&forecast.point, level),
        }
    }

    fn snapshot(&self) -> &TrainingSeries {
        &self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_history(days: i64) -> Vec<DailyTotal> {
        (0..days)
            .map(|i| DailyTotal {
                date: date(2024, 1, 1) + Duration::days(i),
                arrivals: (if i % 7 >= 5 { 6000 } else { 4000 }) + i * 10,
            })
            .collect()
    }

    #[test]
    fn test_series_fills_gaps_with_zero() {
        let history = vec![
            DailyTotal {
                date: date(2024, 1, 1),
                arrivals: 10,
            },
            DailyTotal {
                date: date(2024, 1, 4),
                arrivals: 40,
            },
        ];
        let series = TrainingSeries::from_daily_totals("Oahu", &history).unwrap();
        assert_eq!(series.values, vec![10.0, 0.0, 0.0, 40.0]);
        assert_eq!(series.last_date(), date(2024, 1, 4));
        assert!(TrainingSeries::from_daily_totals("Oahu", &[]).is_none());
    }

    #[test]
    fn test_short_series_is_rejected() {
        let series = TrainingSeries::from_daily_totals("Oahu", &weekly_history(6)).unwrap();
        assert!(matches!(
            MstlTrainer::default().fit(&series),
            Err(ForecastError::InsufficientData { needed: 7, got: 6 })
        ));
    }

    #[test]
    fn test_model_choice_follows_series_length() {
        let short = TrainingSeries::from_daily_totals("Maui", &weekly_history(10)).unwrap();
        let long = TrainingSeries::from_daily_totals("Maui", &weekly_history(28)).unwrap();

        let trainer = MstlTrainer::default();
        assert_eq!(trainer.fit(&short).unwrap().name(), "ets");
        assert_eq!(trainer.fit(&long).unwrap().name(), "mstl");
    }

    #[test]
    fn test_fitted_model_is_reused_across_predictions() {
        let series = TrainingSeries::from_daily_totals("Oahu", &weekly_history(35)).unwrap();
        let model = MstlTrainer::default().fit(&series).unwrap();

        let first = model.predict(14, 0.95).unwrap();
        let shared = Arc::clone(&model);
        let second = std::thread::spawn(move || shared.predict(14, 0.95).unwrap())
            .join()
            .unwrap();

        assert_eq!(first, second);
        assert!(format!("{model:?}").contains("Oahu"));
    }

    #[test]
    fn test_prediction_length_is_capped() {
        let series = TrainingSeries::from_daily_totals("Kauai", &weekly_history(28)).unwrap();
        let model = MstlTrainer { max_steps: 5 }.fit(&series).unwrap();

        let predicted = model.predict(9, 0.95).unwrap();
        assert_eq!(predicted.len(), 5);
        assert_eq!(model.last_observed(), date(2024, 1, 28));
        assert!(predicted.iter().all(|p| p.point.is_finite()));
    }
}
