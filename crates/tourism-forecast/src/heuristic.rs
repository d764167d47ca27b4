//! Seasonal/weekday baseline used when no model is available.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use tourism_domain::{DailyForecast, Season, is_weekend};

/// Name recorded with heuristic forecasts.
pub const BASELINE_MODEL: &str = "baseline";

const PEAK_FACTOR: f64 = 1.2;
const SHOULDER_FACTOR: f64 = 1.1;
const WEEKEND_FACTOR: f64 = 1.1;
const LOWER_FACTOR: f64 = 0.85;
const UPPER_FACTOR: f64 = 1.15;

/// Seasonal multiplier for a date.
#[must_use]
pub fn seasonal_factor(date: NaiveDate) -> f64 {
    match Season::of(date) {
        Season::Peak => PEAK_FACTOR,
        Season::Shoulder => SHOULDER_FACTOR,
        Season::Regular => 1.0,
    }
}

/// Weekend multiplier for a date.
#[must_use]
pub fn weekend_factor(date: NaiveDate) -> f64 {
    if is_weekend(date) { WEEKEND_FACTOR } else { 1.0 }
}

/// Forecast `horizon` days from `start` off a trailing average.
///
/// Each day applies the seasonal and weekend multipliers and a uniform
/// jitter in [0.95, 1.05). Values are truncated to whole visitors.
#[allow(clippy::cast_possible_truncation)]
pub fn baseline_forecast<R: Rng>(
    location: &str,
    trailing_average: f64,
    start: NaiveDate,
    horizon: usize,
    rng: &mut R,
) -> Vec<DailyForecast> {
    (0..horizon)
        .map(|offset| {
            let date = start + Duration::days(i64::try_from(offset).unwrap_or(i64::MAX));
            let jitter: f64 = rng.gen_range(0.95..1.05);
            let predicted =
                (trailing_average * seasonal_factor(date) * weekend_factor(date) * jitter) as i64;
            let lower = (predicted as f64 * LOWER_FACTOR) as i64;
            let upper = (predicted as f64 * UPPER_FACTOR) as i64;
            DailyForecast::bounded(date, location, predicted, lower, upper)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mean(days: &[DailyForecast]) -> f64 {
        days.iter().map(|d| d.predicted_arrivals as f64).sum::<f64>() / days.len() as f64
    }

    #[test]
    fn test_factors() {
        assert!((seasonal_factor(date(2024, 1, 10)) - 1.2).abs() < 1e-9);
        assert!((seasonal_factor(date(2024, 7, 10)) - 1.1).abs() < 1e-9);
        assert!((seasonal_factor(date(2024, 4, 10)) - 1.0).abs() < 1e-9);
        // 2024-04-13 is a Saturday
        assert!((weekend_factor(date(2024, 4, 13)) - 1.1).abs() < 1e-9);
        assert!((weekend_factor(date(2024, 4, 10)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_are_ordered() {
        let mut rng = StdRng::seed_from_u64(7);
        let days = baseline_forecast("Oahu", 5000.0, date(2024, 1, 1), 366, &mut rng);

        assert_eq!(days.len(), 366);
        for day in &days {
            assert!(day.is_well_ordered());
            assert_eq!(day.confidence_lower, (day.predicted_arrivals as f64 * 0.85) as i64);
        }
        assert_eq!(days[365].date, date(2024, 12, 31));
    }

    #[test]
    fn test_weekday_range() {
        let mut rng = StdRng::seed_from_u64(1);
        // Wednesday in April: no multipliers apply
        let day = &baseline_forecast("Maui", 5000.0, date(2024, 4, 10), 1, &mut rng)[0];
        assert!((4750..5250).contains(&day.predicted_arrivals));
    }

    #[test]
    fn test_peak_season_not_below_shoulder() {
        let mut rng = StdRng::seed_from_u64(42);
        let peak = baseline_forecast("Kauai", 4000.0, date(2024, 12, 1), 28, &mut rng);
        let shoulder = baseline_forecast("Kauai", 4000.0, date(2024, 6, 2), 28, &mut rng);

        assert!(mean(&peak) >= mean(&shoulder));
    }

    #[test]
    fn test_zero_horizon() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(baseline_forecast("Lanai", 5000.0, date(2024, 1, 1), 0, &mut rng).is_empty());
    }
}
