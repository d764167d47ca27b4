//! Analytics query engine with a content-hash result cache.

use crate::error::{AnalyticsError, Result};
use crate::insights::derive_insights;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tourism_domain::{AnalyticsRequest, CacheEntry, Clock, DateRange, Metric, RecordFilter};
use tourism_persistence::{
    ArrivalGroup, ArrivalRepository, CacheError, EconomicRepository, OccupancyGroup,
    OccupancyRepository, OriginTotal, QueryCacheRepository, ReadStrategy, RecordStore,
};

/// Number of origin markets reported with the arrivals block.
pub const TOP_ORIGINS: usize = 10;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Analytics engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsConfig {
    /// Lifetime of a cached result
    pub cache_ttl: Duration,
    /// How cached results are combined with fresh computation
    pub read_strategy: ReadStrategy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            read_strategy: ReadStrategy::CacheFirst,
        }
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Full answer to an analytics request, as stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    /// The normalized request this result answers
    pub request: AnalyticsRequest,
    /// When the aggregates were computed
    pub generated_at: DateTime<Utc>,
    /// One block per requested metric
    pub data: MetricData,
    /// Plain-language observations derived from the blocks
    pub insights: Vec<String>,
}

/// Aggregate blocks keyed by metric; absent when the metric was not requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricData {
    /// Arrivals block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrivals: Option<ArrivalsBlock>,
    /// Occupancy block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<OccupancyBlock>,
    /// Spending block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spending: Option<SpendingBlock>,
}

/// Grouped arrivals with totals and origin markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalsBlock {
    /// Arrivals per (period, location)
    pub time_series: Vec<ArrivalGroup>,
    /// Sum over every group
    pub total_arrivals: i64,
    /// Total divided by the number of groups, unrounded
    pub average_arrivals: f64,
    /// Largest origin markets, biggest first
    pub top_origins: Vec<OriginTotal>,
}

/// Grouped occupancy with overall statistics. Zeros when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyBlock {
    /// Averages per (period, location)
    pub time_series: Vec<OccupancyGroup>,
    /// Mean occupancy rate (1 dp)
    pub average_occupancy: f64,
    /// Mean average daily rate (2 dp)
    pub average_adr: f64,
    /// Highest occupancy rate (1 dp)
    pub peak_occupancy: f64,
    /// Lowest occupancy rate (1 dp)
    pub low_occupancy: f64,
}

/// Visitor spending block. An empty range is reported explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpendingBlock {
    /// No economic records in range
    NoData {
        /// Explanation shown to the caller
        message: String,
    },
    /// Spending series and summary
    Available(SpendingSummary),
}

impl SpendingBlock {
    /// Summary when data was available.
    #[must_use]
    pub const fn summary(&self) -> Option<&SpendingSummary> {
        match self {
            Self::NoData { .. } => None,
            Self::Available(summary) => Some(summary),
        }
    }
}

/// Spending series with totals and direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    /// Spending per indicator date, ascending
    pub time_series: Vec<SpendingPoint>,
    /// Total spending in millions (1 dp)
    pub total_spending_millions: f64,
    /// Mean spending per record in millions (1 dp)
    pub average_spending_millions: f64,
    /// Direction of the series
    pub trend: Trend,
}

/// Visitor spending on one indicator date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendingPoint {
    /// Indicator date
    pub date: NaiveDate,
    /// Spending in millions
    pub visitor_spending_millions: f64,
}

/// Direction of a spending series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Last value above the first
    Increasing,
    /// Anything else
    Stable,
}

// =============================================================================
// FINGERPRINT
// =============================================================================

/// Deterministic cache key for a request.
///
/// The request is normalized (location and metric sets sorted and
/// de-duplicated), serialized as JSON with sorted object keys and hashed
/// with SHA-256. Returns lowercase hex.
pub fn fingerprint(request: &AnalyticsRequest) -> Result<String> {
    // serde_json::Value objects are BTreeMap-backed, so keys come out sorted.
    let canonical = serde_json::to_value(request.normalized())?;
    let digest = Sha256::digest(canonical.to_string().as_bytes());
    Ok(format!("{digest:x}"))
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// =============================================================================
// ENGINE
// =============================================================================

/// Analytics engine over a record store and a query cache.
pub struct AnalyticsEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    cache: Arc<dyn QueryCacheRepository>,
    pub(crate) clock: Arc<dyn Clock>,
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    /// Create an engine.
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn QueryCacheRepository>,
        clock: Arc<dyn Clock>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            config,
        }
    }

    /// Engine configuration.
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Answer an analytics request, serving a still-valid cached result when
    /// one exists.
    pub async fn process_query(&self, request: &AnalyticsRequest) -> Result<AnalyticsResult> {
        request.validate()?;
        let request = request.normalized();
        let key = fingerprint(&request)?;
        let now = self.clock.now();
        let ttl = chrono::Duration::from_std(self.config.cache_ttl)
            .map_err(|e| AnalyticsError::InvalidParameter(format!("cache ttl: {e}")))?;

        let fetched = self
            .config
            .read_strategy
            .read(
                || self.cached_result(&key, now),
                || self.compute(&request),
                |result| self.store_result(&key, result, now, ttl),
            )
            .await?;

        tracing::debug!(
            fingerprint = %key,
            cached = fetched.is_cached(),
            metrics = request.metrics.len(),
            "Analytics query served"
        );
        Ok(fetched.value)
    }

    async fn cached_result(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Option<AnalyticsResult>, CacheError> {
        let Some(entry) = self
            .cache
            .find_valid(key, now)
            .await
            .map_err(CacheError::new)?
        else {
            return Ok(None);
        };
        serde_json::from_str(&entry.payload)
            .map(Some)
            .map_err(CacheError::new)
    }

    async fn store_result(
        &self,
        key: &str,
        result: AnalyticsResult,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> std::result::Result<(), CacheError> {
        let payload = serde_json::to_string(&result).map_err(CacheError::new)?;
        let entry = CacheEntry::new(key, payload, now, ttl);
        self.cache
            .insert_entry(&entry)
            .await
            .map_err(CacheError::new)
    }

    /// Run the aggregation pass for a validated, normalized request.
    async fn compute(&self, request: &AnalyticsRequest) -> Result<AnalyticsResult> {
        let filter = request.filter();
        let mut data = MetricData::default();

        if request.includes(Metric::Arrivals) {
            data.arrivals = Some(self.arrivals_block(&filter, request).await?);
        }
        if request.includes(Metric::Occupancy) {
            data.occupancy = Some(self.occupancy_block(&filter, request).await?);
        }
        if request.includes(Metric::Spending) {
            data.spending = Some(self.spending_block(&filter.range).await?);
        }

        let insights = derive_insights(&data);
        Ok(AnalyticsResult {
            request: request.clone(),
            generated_at: self.clock.now(),
            data,
            insights,
        })
    }

    async fn arrivals_block(
        &self,
        filter: &RecordFilter,
        request: &AnalyticsRequest,
    ) -> Result<ArrivalsBlock> {
        let time_series = self
            .store
            .arrivals_by_period(filter, request.group_by)
            .await?;
        let top_origins = self.store.top_origins(filter, TOP_ORIGINS).await?;

        let total_arrivals: i64 = time_series.iter().map(|g| g.arrivals).sum();
        let groups = time_series.len().max(1);
        #[allow(clippy::cast_precision_loss)]
        let average_arrivals = total_arrivals as f64 / groups as f64;

        Ok(ArrivalsBlock {
            time_series,
            total_arrivals,
            average_arrivals,
            top_origins,
        })
    }

    async fn occupancy_block(
        &self,
        filter: &RecordFilter,
        request: &AnalyticsRequest,
    ) -> Result<OccupancyBlock> {
        let time_series = self
            .store
            .occupancy_by_period(filter, request.group_by)
            .await?;
        let stats = self.store.occupancy_stats(filter).await?;

        Ok(match stats {
            Some(stats) => OccupancyBlock {
                time_series,
                average_occupancy: round_to(stats.average_occupancy, 1),
                average_adr: round_to(stats.average_daily_rate, 2),
                peak_occupancy: round_to(stats.peak_occupancy, 1),
                low_occupancy: round_to(stats.low_occupancy, 1),
            },
            None => OccupancyBlock {
                time_series,
                average_occupancy: 0.0,
                average_adr: 0.0,
                peak_occupancy: 0.0,
                low_occupancy: 0.0,
            },
        })
    }

    async fn spending_block(&self, range: &DateRange) -> Result<SpendingBlock> {
        let records = self.store.indicators_in_range(range).await?;
        if records.is_empty() {
            return Ok(SpendingBlock::NoData {
                message: "No economic data available for the selected period".to_string(),
            });
        }

        let time_series: Vec<SpendingPoint> = records
            .iter()
            .map(|r| SpendingPoint {
                date: r.date,
                visitor_spending_millions: r.visitor_spending_millions,
            })
            .collect();
        let total: f64 = time_series.iter().map(|p| p.visitor_spending_millions).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = total / time_series.len() as f64;

        let trend = match (time_series.first(), time_series.last()) {
            (Some(first), Some(last))
                if time_series.len() > 1
                    && last.visitor_spending_millions > first.visitor_spending_millions =>
            {
                Trend::Increasing
            }
            _ => Trend::Stable,
        };

        Ok(SpendingBlock::Available(SpendingSummary {
            time_series,
            total_spending_millions: round_to(total, 1),
            average_spending_millions: round_to(average, 1),
            trend,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use tourism_domain::{
        ArrivalRecord, EconomicRecord, FixedClock, Granularity, OccupancyRecord,
    };
    use tourism_persistence::DuckDbStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine_with(store: Arc<DuckDbStore>, clock: Arc<FixedClock>) -> AnalyticsEngine {
        AnalyticsEngine::new(store.clone(), store, clock, AnalyticsConfig::default())
    }

    async fn january_oahu_store() -> Arc<DuckDbStore> {
        let store = DuckDbStore::open_in_memory().unwrap();
        let records: Vec<_> = (1..=31)
            .map(|d| ArrivalRecord::new(date(2024, 1, d), "Oahu", 1000).with_origin("California"))
            .collect();
        store.insert_arrivals(&records).await.unwrap();
        Arc::new(store)
    }

    fn january_request() -> AnalyticsRequest {
        AnalyticsRequest::new(date(2024, 1, 1), date(2024, 1, 31))
    }

    #[test]
    fn test_fingerprint_ignores_list_order() {
        let a = january_request()
            .with_locations(["Oahu", "Maui"])
            .with_metrics([Metric::Spending, Metric::Arrivals]);
        let b = january_request()
            .with_locations(["Maui", "Oahu", "Maui"])
            .with_metrics([Metric::Arrivals, Metric::Spending]);

        let fp = fingerprint(&a).unwrap();
        assert_eq!(fp, fingerprint(&b).unwrap());
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let c = a.clone().grouped_by(Granularity::Day);
        assert_ne!(fp, fingerprint(&c).unwrap());
    }

    #[tokio::test]
    async fn test_daily_arrivals_totals() {
        let store = january_oahu_store().await;
        let engine = engine_with(store, Arc::new(FixedClock::at_date(date(2024, 2, 1))));

        let request = january_request()
            .with_locations(["Oahu"])
            .with_metrics([Metric::Arrivals])
            .grouped_by(Granularity::Day);
        let result = engine.process_query(&request).await.unwrap();

        let arrivals = result.data.arrivals.unwrap();
        assert_eq!(arrivals.total_arrivals, 31_000);
        assert!((arrivals.average_arrivals - 1000.0).abs() < 1e-9);
        assert_eq!(arrivals.time_series.len(), 31);
        assert_eq!(arrivals.top_origins[0].origin, "California");
        assert!(result.data.occupancy.is_none());
        assert!(result.data.spending.is_none());
        assert_eq!(
            result.insights,
            vec![
                "Visitors from California represent your largest market with 31,000 arrivals"
                    .to_string(),
                "Average 1,000 daily arrivals provides baseline for capacity planning".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_occupancy_block_and_insight() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let records: Vec<_> = [70.0, 80.0, 90.0]
            .into_iter()
            .zip(1..)
            .map(|(rate, day)| OccupancyRecord {
                date: date(2024, 1, day),
                location: "Maui".to_string(),
                occupancy_rate: rate,
                average_daily_rate: 300.0,
                revenue_per_available_room: Some(240.0),
            })
            .collect();
        store.insert_occupancy(&records).await.unwrap();
        let engine = engine_with(Arc::new(store), Arc::new(FixedClock::at_date(date(2024, 2, 1))));

        let request = january_request().with_metrics([Metric::Occupancy]);
        let result = engine.process_query(&request).await.unwrap();

        let occupancy = result.data.occupancy.unwrap();
        assert!((occupancy.average_occupancy - 80.0).abs() < 1e-9);
        assert!((occupancy.peak_occupancy - 90.0).abs() < 1e-9);
        assert!((occupancy.low_occupancy - 70.0).abs() < 1e-9);
        assert!((occupancy.average_adr - 300.0).abs() < 1e-9);
        assert!(result.insights.is_empty());
    }

    #[tokio::test]
    async fn test_empty_occupancy_is_zeros_and_spending_is_no_data() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        let engine = engine_with(store, Arc::new(FixedClock::at_date(date(2024, 2, 1))));

        let result = engine.process_query(&january_request()).await.unwrap();

        let occupancy = result.data.occupancy.unwrap();
        assert!(occupancy.time_series.is_empty());
        assert!(occupancy.average_occupancy.abs() < f64::EPSILON);
        assert!(matches!(
            result.data.spending,
            Some(SpendingBlock::NoData { .. })
        ));
        assert_eq!(result.data.arrivals.unwrap().total_arrivals, 0);

        let json = serde_json::to_value(&engine.process_query(&january_request()).await.unwrap())
            .unwrap();
        assert_eq!(json["data"]["spending"]["status"], "no_data");
    }

    #[tokio::test]
    async fn test_spending_trend_and_per_visitor_insight() {
        let store = january_oahu_store().await;
        let indicators = vec![
            EconomicRecord {
                date: date(2024, 1, 1),
                unemployment_rate: 3.0,
                visitor_spending_millions: 10.0,
                gdp_growth_rate: None,
            },
            EconomicRecord {
                date: date(2024, 1, 15),
                unemployment_rate: 3.0,
                visitor_spending_millions: 21.0,
                gdp_growth_rate: None,
            },
        ];
        store.insert_indicators(&indicators).await.unwrap();
        let engine = engine_with(store, Arc::new(FixedClock::at_date(date(2024, 2, 1))));

        let request = january_request().with_metrics([Metric::Arrivals, Metric::Spending]);
        let result = engine.process_query(&request).await.unwrap();

        let spending = result.data.spending.as_ref().and_then(SpendingBlock::summary).unwrap();
        assert_eq!(spending.trend, Trend::Increasing);
        assert!((spending.total_spending_millions - 31.0).abs() < 1e-9);
        assert!((spending.average_spending_millions - 15.5).abs() < 1e-9);
        // 31M spent by 31,000 visitors
        assert!(result
            .insights
            .contains(&"Average visitor spending is $1000 - focus on high-value visitor segments".to_string()));
    }

    #[tokio::test]
    async fn test_repeat_query_is_served_from_cache() {
        let store = january_oahu_store().await;
        let clock = Arc::new(FixedClock::at_date(date(2024, 2, 1)));
        let engine = engine_with(store.clone(), clock.clone());
        let request = january_request().with_metrics([Metric::Arrivals]);

        let first = engine.process_query(&request).await.unwrap();

        // New data inside the range must not show up while the entry is valid.
        store
            .insert_arrivals(&[ArrivalRecord::new(date(2024, 1, 10), "Oahu", 5000)])
            .await
            .unwrap();
        clock.advance(ChronoDuration::minutes(30));

        let second = engine.process_query(&request).await.unwrap();
        assert_eq!(first, second);

        let key = fingerprint(&request).unwrap();
        assert_eq!(store.count_entries(&key).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_payload_is_byte_identical() {
        let store = january_oahu_store().await;
        store
            .insert_arrivals(&[ArrivalRecord::new(date(2024, 1, 2), "Oahu", 1)])
            .await
            .unwrap();
        store
            .insert_indicators(&[
                EconomicRecord {
                    date: date(2024, 1, 1),
                    unemployment_rate: 2.912_345_678_901_234,
                    visitor_spending_millions: 1859.794_120_780_816_7,
                    gdp_growth_rate: None,
                },
                EconomicRecord {
                    date: date(2024, 1, 20),
                    unemployment_rate: 2.9,
                    visitor_spending_millions: 1713.062_958_172_435_4,
                    gdp_growth_rate: None,
                },
            ])
            .await
            .unwrap();
        let clock = Arc::new(FixedClock::at_date(date(2024, 2, 1)));
        let engine = engine_with(store.clone(), clock.clone());
        let request = january_request().grouped_by(Granularity::Day);

        let first = engine.process_query(&request).await.unwrap();
        clock.advance(ChronoDuration::minutes(5));
        let second = engine.process_query(&request).await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let spending = second.data.spending.as_ref().and_then(SpendingBlock::summary).unwrap();
        assert_eq!(
            spending.time_series[0].visitor_spending_millions.to_bits(),
            1859.794_120_780_816_7_f64.to_bits()
        );
        assert_eq!(store.count_entries(&fingerprint(&request).unwrap()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_average_arrivals_is_unrounded() {
        let store = january_oahu_store().await;
        store
            .insert_arrivals(&[ArrivalRecord::new(date(2024, 1, 2), "Oahu", 1)])
            .await
            .unwrap();
        let engine = engine_with(store, Arc::new(FixedClock::at_date(date(2024, 2, 1))));
        let request = january_request()
            .with_metrics([Metric::Arrivals])
            .grouped_by(Granularity::Day);

        let arrivals = engine.process_query(&request).await.unwrap().data.arrivals.unwrap();
        assert_eq!(arrivals.total_arrivals, 31_001);
        assert_eq!(arrivals.average_arrivals, 31_001.0 / 31.0);
    }

    #[tokio::test]
    async fn test_expired_entry_recomputes_and_appends() {
        let store = january_oahu_store().await;
        let clock = Arc::new(FixedClock::at_date(date(2024, 2, 1)));
        let engine = engine_with(store.clone(), clock.clone());
        let request = january_request().with_metrics([Metric::Arrivals]);

        let first = engine.process_query(&request).await.unwrap();
        store
            .insert_arrivals(&[ArrivalRecord::new(date(2024, 1, 10), "Oahu", 5000)])
            .await
            .unwrap();
        clock.advance(ChronoDuration::minutes(61));

        let second = engine.process_query(&request).await.unwrap();
        assert_eq!(first.data.arrivals.unwrap().total_arrivals, 31_000);
        assert_eq!(second.data.arrivals.unwrap().total_arrivals, 36_000);

        let key = fingerprint(&request).unwrap();
        assert_eq!(store.count_entries(&key).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        let engine = engine_with(store, Arc::new(FixedClock::at_date(date(2024, 2, 1))));

        let request = AnalyticsRequest::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(
            engine.process_query(&request).await,
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(80.04, 1) - 80.0).abs() < 1e-9);
        assert!((round_to(249.999, 2) - 250.0).abs() < 1e-9);
    }
}
