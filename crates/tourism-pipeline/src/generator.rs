//! Synthetic arrivals, occupancy and economic indicators.
//!
//! Values follow fixed per-island baselines with seasonal, weekday and
//! origin-market multipliers, so a seeded store has realistic shape for
//! dashboards and model training.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tourism_domain::{ArrivalRecord, EconomicRecord, Island, OccupancyRecord, is_weekend};

/// Origin markets and their share multiplier
pub const ORIGIN_MARKETS: [(&str, f64); 5] = [
    ("California", 1.5),
    ("Texas", 0.8),
    ("Washington", 1.0),
    ("Oregon", 0.9),
    ("New York", 0.7),
];

/// Days between economic indicator samples
pub const INDICATOR_INTERVAL_DAYS: u32 = 30;

const MAX_OCCUPANCY: f64 = 0.95;
const MAX_NOISE: f64 = 0.5;

const fn base_arrivals(island: Island) -> f64 {
    match island {
        Island::Oahu => 5000.0,
        Island::Maui => 3000.0,
        Island::Kauai => 2000.0,
        Island::Hawaii => 2500.0,
        Island::Molokai => 200.0,
        Island::Lanai => 150.0,
    }
}

const fn base_occupancy(island: Island) -> f64 {
    match island {
        Island::Oahu => 0.80,
        Island::Maui => 0.75,
        Island::Kauai => 0.70,
        Island::Hawaii => 0.72,
        Island::Molokai => 0.60,
        Island::Lanai => 0.65,
    }
}

const fn base_adr(island: Island) -> f64 {
    match island {
        Island::Oahu => 250.0,
        Island::Maui => 350.0,
        Island::Kauai => 300.0,
        Island::Hawaii => 275.0,
        Island::Molokai => 150.0,
        Island::Lanai => 450.0,
    }
}

/// Multiplier for winter (Dec-Feb) and summer (Jun-Aug) months.
const fn seasonal(month: u32, winter: f64, summer: f64) -> f64 {
    match month {
        12 | 1 | 2 => winter,
        6..=8 => summer,
        _ => 1.0,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Generation window and noise.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    /// Day after the last generated day
    pub end: NaiveDate,
    /// Number of days to generate
    pub days: u32,
    /// Relative uniform noise on arrival counts, clamped to [0, 0.5]
    pub noise: f64,
}

/// Records produced by one generation run.
#[derive(Debug, Clone, Default)]
pub struct SyntheticDataset {
    pub arrivals: Vec<ArrivalRecord>,
    pub occupancy: Vec<OccupancyRecord>,
    pub indicators: Vec<EconomicRecord>,
}

/// Deterministic record generator with optional noise.
pub struct SyntheticGenerator<R: Rng> {
    config: GeneratorConfig,
    rng: R,
}

impl SyntheticGenerator<StdRng> {
    /// Generator seeded from `seed`, or from entropy when unset.
    pub fn seeded(config: GeneratorConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::new(config, rng)
    }
}

impl<R: Rng> SyntheticGenerator<R> {
    pub const fn new(config: GeneratorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    fn dates(&self) -> impl Iterator<Item = (u32, NaiveDate)> + use<R> {
        let first = self.config.end - Duration::days(i64::from(self.config.days));
        (0..self.config.days).map(move |i| (i, first + Duration::days(i64::from(i))))
    }

    pub fn generate(&mut self) -> SyntheticDataset {
        SyntheticDataset {
            arrivals: self.arrivals(),
            occupancy: self.occupancy(),
            indicators: self.indicators(),
        }
    }

    /// One air-arrival record per day, island and origin market.
    #[allow(clippy::cast_possible_truncation)]
    pub fn arrivals(&mut self) -> Vec<ArrivalRecord> {
        let noise = self.config.noise.clamp(0.0, MAX_NOISE);
        let mut records =
            Vec::with_capacity(self.config.days as usize * Island::ALL.len() * ORIGIN_MARKETS.len());

        for (i, date) in self.dates() {
            let weekly = 0.9 + 0.2 * f64::from(i % 7) / 7.0;
            for island in Island::ALL {
                for (origin, share) in ORIGIN_MARKETS {
                    let jitter = if noise > 0.0 {
                        self.rng.gen_range(1.0 - noise..=1.0 + noise)
                    } else {
                        1.0
                    };
                    let count = base_arrivals(island)
                        * seasonal(date.month(), 1.3, 1.2)
                        * share
                        * weekly
                        * jitter;
                    records.push(
                        ArrivalRecord::new(date, island.as_str(), count as i64).with_origin(origin),
                    );
                }
            }
        }
        records
    }

    /// One occupancy record per day and island.
    pub fn occupancy(&self) -> Vec<OccupancyRecord> {
        let mut records = Vec::with_capacity(self.config.days as usize * Island::ALL.len());

        for (i, date) in self.dates() {
            let season = seasonal(date.month(), 1.15, 1.10);
            let weekend = if is_weekend(date) { 1.1 } else { 1.0 };
            let monthly = 0.95 + 0.1 * f64::from(i % 30) / 30.0;

            for island in Island::ALL {
                let occupancy =
                    (base_occupancy(island) * season * weekend * monthly).min(MAX_OCCUPANCY);
                let adr = base_adr(island) * season * weekend;
                records.push(OccupancyRecord {
                    date,
                    location: island.as_str().to_string(),
                    occupancy_rate: round_to(occupancy * 100.0, 1),
                    average_daily_rate: round_to(adr, 2),
                    revenue_per_available_room: Some(round_to(occupancy * adr, 2)),
                });
            }
        }
        records
    }

    /// Economic indicators every [`INDICATOR_INTERVAL_DAYS`] days.
    pub fn indicators(&self) -> Vec<EconomicRecord> {
        self.dates()
            .filter(|(i, _)| i % INDICATOR_INTERVAL_DAYS == 0)
            .map(|(i, date)| {
                let i = f64::from(i);
                let unemployment = 2.8 + 0.3 * ((i % 180.0) / 180.0);
                let season = if matches!(date.month(), 12 | 1 | 2 | 6..=8) { 1.2 } else { 1.0 };
                let spending = 1500.0 * season * (0.95 + 0.1 * (i % 90.0) / 90.0);
                let gdp_growth = 2.5 + 0.5 * ((i % 120.0) / 120.0);

                EconomicRecord {
                    date,
                    unemployment_rate: round_to(unemployment, 1),
                    visitor_spending_millions: round_to(spending, 1),
                    gdp_growth_rate: Some(round_to(gdp_growth, 1)),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> GeneratorConfig {
        GeneratorConfig {
            end: date(2024, 2, 1),
            days: 31,
            noise: 0.0,
        }
    }

    #[test]
    fn test_window_ends_before_end_date() {
        let dataset = SyntheticGenerator::seeded(january(), Some(1)).generate();

        assert_eq!(dataset.arrivals.len(), 31 * 6 * 5);
        assert_eq!(dataset.occupancy.len(), 31 * 6);
        assert_eq!(dataset.indicators.len(), 2);
        assert_eq!(dataset.arrivals[0].date, date(2024, 1, 1));
        assert_eq!(dataset.occupancy.last().unwrap().date, date(2024, 1, 31));
    }

    #[test]
    fn test_winter_baseline_values() {
        let dataset = SyntheticGenerator::seeded(january(), None).generate();

        let first = &dataset.arrivals[0];
        assert_eq!(first.location, "Oahu");
        assert_eq!(first.origin.as_deref(), Some("California"));
        // 5000 * 1.3 winter * 1.5 California * 0.9 weekly
        assert_eq!(first.count, 8775);

        // 2024-01-01 is a Monday: 0.80 * 1.15 * 0.95
        let occupancy = &dataset.occupancy[0];
        assert!((occupancy.occupancy_rate - 87.4).abs() < 1e-9);
        assert!((occupancy.average_daily_rate - 287.5).abs() < 1e-9);

        let indicator = &dataset.indicators[0];
        assert!((indicator.unemployment_rate - 2.8).abs() < 1e-9);
        assert!((indicator.visitor_spending_millions - 1710.0).abs() < 1e-9);
        assert_eq!(indicator.gdp_growth_rate, Some(2.5));
    }

    #[test]
    fn test_occupancy_is_capped() {
        // Weekend in peak season pushes Oahu past the cap
        let config = GeneratorConfig {
            end: date(2024, 1, 1),
            days: 60,
            noise: 0.0,
        };
        let generator = SyntheticGenerator::seeded(config, None);
        assert!(generator.occupancy().iter().all(|o| o.occupancy_rate <= 95.0));
        assert!(generator.occupancy().iter().any(|o| (o.occupancy_rate - 95.0).abs() < 1e-9));
    }

    #[test]
    fn test_noise_stays_in_band() {
        for _ in 0..10 {
            let days: u32 = (1..45).fake();
            let noise: f64 = (0.01..0.3).fake();
            let config = GeneratorConfig {
                end: date(2024, 6, 1),
                days,
                noise,
            };
            let noisy = SyntheticGenerator::seeded(config, Some(9)).arrivals();
            let clean = SyntheticGenerator::seeded(GeneratorConfig { noise: 0.0, ..config }, None)
                .arrivals();

            assert_eq!(noisy.len(), days as usize * 30);
            for (n, c) in noisy.iter().zip(&clean) {
                let ratio = n.count as f64 / c.count as f64;
                assert!(ratio >= 1.0 - noise - 0.02 && ratio <= 1.0 + noise + 0.02);
            }
        }
    }
}
