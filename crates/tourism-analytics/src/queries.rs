//! Predefined dashboard queries.

use crate::engine::{AnalyticsEngine, round_to};
use crate::error::Result;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tourism_domain::{DateRange, Island, RecordFilter, month_start};
use tourism_persistence::{
    ArrivalRepository, DailyOccupancy, DailyTotal, EconomicRepository, LocationOccupancy,
    OccupancyRepository, OriginTotal,
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Month-to-date arrivals
    pub current_month_arrivals: i64,
    /// Arrivals over the whole previous month
    pub previous_month_arrivals: i64,
    /// Growth against the same period last year, percent (1 dp)
    pub year_over_year_growth: f64,
    /// Arrivals since January 1st
    pub year_to_date_arrivals: i64,
    /// Largest origin markets this month
    pub top_origins: Vec<OriginTotal>,
    /// Average occupancy per location this month
    pub occupancy_by_location: Vec<LocationOccupancy>,
}

/// Average arrivals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthAverage {
    /// Month name
    pub month: String,
    /// Rounded mean record count
    pub average_arrivals: i64,
}

/// Monthly seasonality profile for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Location the profile describes
    pub location: String,
    /// Months with data, January first
    pub monthly_averages: Vec<MonthAverage>,
    /// Busiest month
    pub peak_month: Option<String>,
    /// Quietest month
    pub low_month: Option<String>,
}

/// One origin market with its per-location split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMarket {
    /// Origin name
    pub origin: String,
    /// Arrivals over every location
    pub total_arrivals: i64,
    /// Arrivals per location
    pub by_location: BTreeMap<String, i64>,
}

/// Month-to-date figures for one island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    /// Island name
    pub location: String,
    /// Month-to-date arrivals
    pub arrivals: i64,
    /// Mean occupancy rate (1 dp), 0 without data
    pub occupancy_rate: f64,
    /// Mean average daily rate (2 dp), 0 without data
    pub average_daily_rate: f64,
}

/// Economic indicators next to the arrivals of their month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicPoint {
    /// Indicator date
    pub date: NaiveDate,
    /// Unemployment rate, percent
    pub unemployment_rate: f64,
    /// Visitor spending in millions
    pub visitor_spending_millions: f64,
    /// GDP growth rate, percent
    pub gdp_growth_rate: Option<f64>,
    /// Arrivals over the indicator's calendar month
    pub arrivals: i64,
}

/// Economic series with the spending/arrivals correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicCorrelation {
    /// Points ordered by date ascending
    pub points: Vec<EconomicPoint>,
    /// Pearson correlation of spending and arrivals; `None` below two
    /// points or for a constant series
    pub spending_arrivals_correlation: Option<f64>,
}

fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

fn month_name(month: u32) -> String {
    let index = usize::try_from(month.saturating_sub(1)).unwrap_or(0);
    MONTH_NAMES.get(index).copied().unwrap_or("Unknown").to_string()
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    use statrs::statistics::Statistics;

    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }
    let sx = xs.iter().std_dev();
    let sy = ys.iter().std_dev();
    if sx == 0.0 || sy == 0.0 || sx.is_nan() || sy.is_nan() {
        return None;
    }
    let cov = xs.iter().covariance(ys.iter());
    Some(round_to(cov / (sx * sy), 3))
}

impl AnalyticsEngine {
    /// Dashboard headline metrics relative to the clock's current date.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        let today = self.clock.today();
        let this_month = month_start(today);

        let current = RecordFilter::new(DateRange::new(this_month, today)?);
        let current_month_arrivals = self.store.total_arrivals(&current).await?;

        let previous_month_arrivals = match this_month.pred_opt() {
            Some(last_day) => {
                let previous = DateRange::new(month_start(last_day), last_day)?;
                self.store.total_arrivals(&RecordFilter::new(previous)).await?
            }
            None => 0,
        };

        let last_year = match (
            this_month.checked_sub_months(Months::new(12)),
            today.checked_sub_months(Months::new(12)),
        ) {
            (Some(start), Some(end)) => {
                let range = DateRange::new(start, end)?;
                self.store.total_arrivals(&RecordFilter::new(range)).await?
            }
            _ => 0,
        };
        #[allow(clippy::cast_precision_loss)]
        let year_over_year_growth = if last_year == 0 {
            0.0
        } else {
            round_to(
                (current_month_arrivals - last_year) as f64 / last_year as f64 * 100.0,
                1,
            )
        };

        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
        let ytd = RecordFilter::new(DateRange::new(year_start, today)?);
        let year_to_date_arrivals = self.store.total_arrivals(&ytd).await?;

        let top_origins = self.store.top_origins(&current, 5).await?;
        let occupancy_by_location = self.store.occupancy_by_location(&current).await?;

        Ok(DashboardMetrics {
            current_month_arrivals,
            previous_month_arrivals,
            year_over_year_growth,
            year_to_date_arrivals,
            top_origins,
            occupancy_by_location,
        })
    }

    /// Average arrivals per calendar month for a location.
    pub async fn seasonality(&self, location: &str) -> Result<Seasonality> {
        let averages = self.store.monthly_averages(location).await?;

        let peak_month = averages
            .iter()
            .max_by(|a, b| a.average_arrivals.total_cmp(&b.average_arrivals))
            .map(|m| month_name(m.month));
        let low_month = averages
            .iter()
            .min_by(|a, b| a.average_arrivals.total_cmp(&b.average_arrivals))
            .map(|m| month_name(m.month));

        #[allow(clippy::cast_possible_truncation)]
        let monthly_averages = averages
            .iter()
            .map(|m| MonthAverage {
                month: month_name(m.month),
                average_arrivals: m.average_arrivals.round() as i64,
            })
            .collect();

        Ok(Seasonality {
            location: location.to_string(),
            monthly_averages,
            peak_month,
            low_month,
        })
    }

    /// Origin markets over a range (default: the last 30 days), biggest
    /// first, limited to the top ten.
    pub async fn origin_analysis(&self, range: Option<DateRange>) -> Result<Vec<OriginMarket>> {
        let range = range.unwrap_or_else(|| DateRange::trailing(self.clock.today(), 30));
        let rows = self.store.origin_breakdown(&RecordFilter::new(range)).await?;

        let mut markets: BTreeMap<String, OriginMarket> = BTreeMap::new();
        for row in rows {
            let market = markets
                .entry(row.origin.clone())
                .or_insert_with(|| OriginMarket {
                    origin: row.origin.clone(),
                    total_arrivals: 0,
                    by_location: BTreeMap::new(),
                });
            market.total_arrivals += row.arrivals;
            *market.by_location.entry(row.location).or_insert(0) += row.arrivals;
        }

        let mut markets: Vec<_> = markets.into_values().collect();
        markets.sort_by(|a, b| {
            b.total_arrivals
                .cmp(&a.total_arrivals)
                .then_with(|| a.origin.cmp(&b.origin))
        });
        markets.truncate(crate::engine::TOP_ORIGINS);
        Ok(markets)
    }

    /// Daily arrival totals over the last `days` days.
    pub async fn visitor_trends(
        &self,
        days: i64,
        location: Option<&str>,
    ) -> Result<Vec<DailyTotal>> {
        let filter = self.trailing_filter(days, location);
        Ok(self.store.daily_totals(&filter).await?)
    }

    /// Daily occupancy averages over the last `days` days.
    pub async fn occupancy_trends(
        &self,
        days: i64,
        location: Option<&str>,
    ) -> Result<Vec<DailyOccupancy>> {
        let filter = self.trailing_filter(days, location);
        Ok(self.store.daily_occupancy(&filter).await?)
    }

    fn trailing_filter(&self, days: i64, location: Option<&str>) -> RecordFilter {
        let filter = RecordFilter::new(DateRange::trailing(self.clock.today(), days.max(0)));
        match location {
            Some(location) => filter.with_locations([location]),
            None => filter,
        }
    }

    /// Month-to-date arrivals and occupancy for every island.
    pub async fn location_comparison(&self) -> Result<Vec<LocationSnapshot>> {
        let today = self.clock.today();
        let range = DateRange::new(month_start(today), today)?;

        let occupancy: BTreeMap<String, LocationOccupancy> = self
            .store
            .occupancy_by_location(&RecordFilter::new(range))
            .await?
            .into_iter()
            .map(|o| (o.location.clone(), o))
            .collect();

        let mut snapshots = Vec::with_capacity(Island::ALL.len());
        for island in Island::ALL {
            let name = island.as_str();
            let filter = RecordFilter::new(range).with_locations([name]);
            let arrivals = self.store.total_arrivals(&filter).await?;
            let (occupancy_rate, average_daily_rate) = occupancy
                .get(name)
                .map_or((0.0, 0.0), |o| {
                    (round_to(o.occupancy_rate, 1), round_to(o.average_daily_rate, 2))
                });
            snapshots.push(LocationSnapshot {
                location: name.to_string(),
                arrivals,
                occupancy_rate,
                average_daily_rate,
            });
        }
        Ok(snapshots)
    }

    /// The latest twelve economic records with the arrivals of their month.
    pub async fn economic_correlation(&self) -> Result<EconomicCorrelation> {
        let mut indicators = self.store.latest_indicators(12).await?;
        indicators.reverse();

        let mut points = Vec::with_capacity(indicators.len());
        for record in indicators {
            let range = DateRange::new(month_start(record.date), month_end(record.date))?;
            let arrivals = self.store.total_arrivals(&RecordFilter::new(range)).await?;
            points.push(EconomicPoint {
                date: record.date,
                unemployment_rate: record.unemployment_rate,
                visitor_spending_millions: record.visitor_spending_millions,
                gdp_growth_rate: record.gdp_growth_rate,
                arrivals,
            });
        }

        let spending: Vec<f64> = points.iter().map(|p| p.visitor_spending_millions).collect();
        #[allow(clippy::cast_precision_loss)]
        let arrivals: Vec<f64> = points.iter().map(|p| p.arrivals as f64).collect();

        Ok(EconomicCorrelation {
            spending_arrivals_correlation: pearson(&spending, &arrivals),
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnalyticsConfig;
    use std::sync::Arc;
    use tourism_domain::{ArrivalRecord, EconomicRecord, FixedClock, OccupancyRecord};
    use tourism_persistence::DuckDbStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine(store: Arc<DuckDbStore>, today: NaiveDate) -> AnalyticsEngine {
        AnalyticsEngine::new(
            store.clone(),
            store,
            Arc::new(FixedClock::at_date(today)),
            AnalyticsConfig::default(),
        )
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 12, 31)), date(2023, 12, 31));
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(pearson(&xs, &ys), Some(1.0));
        assert_eq!(pearson(&xs, &[5.0, 5.0, 5.0, 5.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[tokio::test]
    async fn test_dashboard_metrics() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .insert_arrivals(&[
                ArrivalRecord::new(date(2024, 3, 2), "Oahu", 1200).with_origin("Japan"),
                ArrivalRecord::new(date(2024, 3, 5), "Maui", 300).with_origin("Canada"),
                ArrivalRecord::new(date(2024, 2, 14), "Oahu", 900),
                ArrivalRecord::new(date(2023, 3, 3), "Oahu", 1000),
                ArrivalRecord::new(date(2024, 1, 20), "Kauai", 100),
            ])
            .await
            .unwrap();
        let engine = engine(Arc::new(store), date(2024, 3, 10));

        let metrics = engine.dashboard_metrics().await.unwrap();
        assert_eq!(metrics.current_month_arrivals, 1500);
        assert_eq!(metrics.previous_month_arrivals, 900);
        assert!((metrics.year_over_year_growth - 50.0).abs() < 1e-9);
        assert_eq!(metrics.year_to_date_arrivals, 2500);
        assert_eq!(metrics.top_origins[0].origin, "Japan");
        assert!(metrics.occupancy_by_location.is_empty());
    }

    #[tokio::test]
    async fn test_growth_is_zero_without_last_year() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        store
            .insert_arrivals(&[ArrivalRecord::new(date(2024, 3, 2), "Oahu", 10)])
            .await
            .unwrap();
        let metrics = engine(store, date(2024, 3, 10)).dashboard_metrics().await.unwrap();
        assert!(metrics.year_over_year_growth.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_seasonality_peak_and_low() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .insert_arrivals(&[
                ArrivalRecord::new(date(2023, 1, 1), "Maui", 900),
                ArrivalRecord::new(date(2023, 1, 2), "Maui", 1100),
                ArrivalRecord::new(date(2023, 5, 1), "Maui", 400),
                ArrivalRecord::new(date(2023, 7, 1), "Maui", 701),
                ArrivalRecord::new(date(2023, 7, 1), "Oahu", 99_999),
            ])
            .await
            .unwrap();
        let seasonality = engine(Arc::new(store), date(2024, 1, 1))
            .seasonality("Maui")
            .await
            .unwrap();

        assert_eq!(seasonality.monthly_averages.len(), 3);
        assert_eq!(seasonality.monthly_averages[0].average_arrivals, 1000);
        assert_eq!(seasonality.peak_month.as_deref(), Some("January"));
        assert_eq!(seasonality.low_month.as_deref(), Some("May"));
    }

    #[tokio::test]
    async fn test_origin_analysis_groups_locations() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .insert_arrivals(&[
                ArrivalRecord::new(date(2024, 6, 1), "Oahu", 50).with_origin("Texas"),
                ArrivalRecord::new(date(2024, 6, 2), "Maui", 70).with_origin("Texas"),
                ArrivalRecord::new(date(2024, 6, 3), "Oahu", 100).with_origin("Japan"),
                ArrivalRecord::new(date(2024, 6, 3), "Oahu", 500),
                ArrivalRecord::new(date(2024, 1, 3), "Oahu", 900).with_origin("Korea"),
            ])
            .await
            .unwrap();
        let markets = engine(Arc::new(store), date(2024, 6, 10))
            .origin_analysis(None)
            .await
            .unwrap();

        assert_eq!(markets.len(), 2);
        assert_eq!(markets[0].origin, "Texas");
        assert_eq!(markets[0].total_arrivals, 120);
        assert_eq!(markets[0].by_location["Maui"], 70);
        assert_eq!(markets[1].origin, "Japan");
    }

    #[tokio::test]
    async fn test_trends_and_comparison() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .insert_arrivals(&[
                ArrivalRecord::new(date(2024, 6, 8), "Oahu", 10),
                ArrivalRecord::new(date(2024, 6, 9), "Oahu", 20),
                ArrivalRecord::new(date(2024, 6, 9), "Lanai", 5),
            ])
            .await
            .unwrap();
        store
            .insert_occupancy(&[OccupancyRecord {
                date: date(2024, 6, 9),
                location: "Oahu".to_string(),
                occupancy_rate: 81.25,
                average_daily_rate: 289.456,
                revenue_per_available_room: None,
            }])
            .await
            .unwrap();
        let engine = engine(Arc::new(store), date(2024, 6, 10));

        let all = engine.visitor_trends(30, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].arrivals, 25);

        let lanai = engine.visitor_trends(30, Some("Lanai")).await.unwrap();
        assert_eq!(lanai, vec![DailyTotal { date: date(2024, 6, 9), arrivals: 5 }]);

        let occupancy = engine.occupancy_trends(7, Some("Oahu")).await.unwrap();
        assert_eq!(occupancy.len(), 1);

        let snapshots = engine.location_comparison().await.unwrap();
        assert_eq!(snapshots.len(), 6);
        let oahu = snapshots.iter().find(|s| s.location == "Oahu").unwrap();
        assert_eq!(oahu.arrivals, 30);
        assert!((oahu.average_daily_rate - 289.46).abs() < 1e-9);
        let molokai = snapshots.iter().find(|s| s.location == "Molokai").unwrap();
        assert_eq!(molokai.arrivals, 0);
    }

    #[tokio::test]
    async fn test_economic_correlation() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let mut indicators = Vec::new();
        let mut arrivals = Vec::new();
        for month in 1..=3u32 {
            indicators.push(EconomicRecord {
                date: date(2024, month, 1),
                unemployment_rate: 3.0,
                visitor_spending_millions: f64::from(month) * 100.0,
                gdp_growth_rate: None,
            });
            arrivals.push(ArrivalRecord::new(date(2024, month, 15), "Oahu", i64::from(month) * 1000));
        }
        store.insert_indicators(&indicators).await.unwrap();
        store.insert_arrivals(&arrivals).await.unwrap();

        let correlation = engine(Arc::new(store), date(2024, 4, 1))
            .economic_correlation()
            .await
            .unwrap();

        assert_eq!(correlation.points.len(), 3);
        assert_eq!(correlation.points[0].date, date(2024, 1, 1));
        assert_eq!(correlation.points[2].arrivals, 3000);
        assert_eq!(correlation.spending_arrivals_correlation, Some(1.0));
    }
}
