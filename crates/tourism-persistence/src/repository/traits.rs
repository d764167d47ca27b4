//! # Repository Traits
//!
//! Abstract record-store interfaces. The analytics and forecast engines only
//! need date-range and location filtering, grouping by day or month and the
//! usual aggregates, so that is all these traits expose.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use tourism_domain::{
    ArrivalRecord, CacheEntry, DateRange, EconomicRecord, ForecastRecord, Granularity,
    OccupancyRecord, RecordFilter,
};

// =============================================================================
// QUERY RESULT ROWS
// =============================================================================

/// Summed arrivals for one (period, location) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalGroup {
    /// `YYYY-MM-DD` for daily groups, `YYYY-MM` for monthly groups
    pub period: String,
    pub location: String,
    pub arrivals: i64,
}

/// Total arrivals from one origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginTotal {
    pub origin: String,
    pub arrivals: i64,
}

/// Total arrivals from one origin into one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginLocationTotal {
    pub origin: String,
    pub location: String,
    pub arrivals: i64,
}

/// Arrivals summed over all matching records for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub arrivals: i64,
}

/// Average record count for one calendar month (1-12).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub month: u32,
    pub average_arrivals: f64,
}

/// Averaged occupancy for one (period, location) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGroup {
    pub period: String,
    pub location: String,
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
    pub revenue_per_available_room: Option<f64>,
}

/// Whole-range occupancy aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupancyStats {
    pub average_occupancy: f64,
    pub average_daily_rate: f64,
    pub peak_occupancy: f64,
    pub low_occupancy: f64,
}

/// Occupancy averaged per day across locations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyOccupancy {
    pub date: NaiveDate,
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
}

/// Occupancy averaged per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationOccupancy {
    pub location: String,
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
}

// =============================================================================
// ARRIVAL REPOSITORY
// =============================================================================

/// Repository for visitor arrival records
#[async_trait]
pub trait ArrivalRepository: Send + Sync {
    /// Append arrival records, returning how many were written
    async fn insert_arrivals(&self, records: &[ArrivalRecord]) -> Result<usize>;

    /// Sum arrivals grouped by (day|month, location), ordered by period then location
    async fn arrivals_by_period(
        &self,
        filter: &RecordFilter,
        granularity: Granularity,
    ) -> Result<Vec<ArrivalGroup>>;

    /// Origins ranked by total arrivals (descending, ties by origin name)
    async fn top_origins(&self, filter: &RecordFilter, limit: usize) -> Result<Vec<OriginTotal>>;

    /// Per (origin, location) totals, records without an origin excluded
    async fn origin_breakdown(&self, filter: &RecordFilter) -> Result<Vec<OriginLocationTotal>>;

    /// Sum of all matching arrivals
    async fn total_arrivals(&self, filter: &RecordFilter) -> Result<i64>;

    /// Arrivals summed per day, ordered by date
    async fn daily_totals(&self, filter: &RecordFilter) -> Result<Vec<DailyTotal>>;

    /// Full daily history for a location, ordered by date
    async fn daily_history(&self, location: &str) -> Result<Vec<DailyTotal>>;

    /// Mean per-record count, `None` when nothing matches
    async fn average_count(&self, filter: &RecordFilter) -> Result<Option<f64>>;

    /// Mean per-record count for each calendar month over all history
    async fn monthly_averages(&self, location: &str) -> Result<Vec<MonthlyAverage>>;
}

// =============================================================================
// OCCUPANCY REPOSITORY
// =============================================================================

/// Repository for hotel occupancy records
#[async_trait]
pub trait OccupancyRepository: Send + Sync {
    /// Append occupancy records (validated first)
    async fn insert_occupancy(&self, records: &[OccupancyRecord]) -> Result<usize>;

    /// Averages grouped by (day|month, location)
    async fn occupancy_by_period(
        &self,
        filter: &RecordFilter,
        granularity: Granularity,
    ) -> Result<Vec<OccupancyGroup>>;

    /// Whole-range aggregates, `None` when nothing matches
    async fn occupancy_stats(&self, filter: &RecordFilter) -> Result<Option<OccupancyStats>>;

    /// Averages per day across the matching locations
    async fn daily_occupancy(&self, filter: &RecordFilter) -> Result<Vec<DailyOccupancy>>;

    /// Averages per location
    async fn occupancy_by_location(&self, filter: &RecordFilter) -> Result<Vec<LocationOccupancy>>;
}

// =============================================================================
// ECONOMIC REPOSITORY
// =============================================================================

/// Repository for economic indicator records
#[async_trait]
pub trait EconomicRepository: Send + Sync {
    /// Append indicator records
    async fn insert_indicators(&self, records: &[EconomicRecord]) -> Result<usize>;

    /// Indicators inside the range, ordered by date ascending
    async fn indicators_in_range(&self, range: &DateRange) -> Result<Vec<EconomicRecord>>;

    /// Most recent indicators, newest first
    async fn latest_indicators(&self, limit: usize) -> Result<Vec<EconomicRecord>>;
}

// =============================================================================
// FORECAST REPOSITORY
// =============================================================================

/// Repository for generated forecasts (append-only history)
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// Append forecast rows
    async fn insert_forecasts(&self, records: &[ForecastRecord]) -> Result<usize>;

    /// Forecast history for a location, newest issue first then by target date
    async fn forecast_history(&self, location: &str, limit: usize) -> Result<Vec<ForecastRecord>>;
}

// =============================================================================
// QUERY CACHE REPOSITORY
// =============================================================================

/// Append-only store of memoized analytics results.
///
/// Entries are never updated or deleted; expiry is checked lazily on read.
#[async_trait]
pub trait QueryCacheRepository: Send + Sync {
    /// Newest entry for the fingerprint that is still valid at `now`
    async fn find_valid(&self, fingerprint: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>>;

    /// Append a new entry
    async fn insert_entry(&self, entry: &CacheEntry) -> Result<()>;

    /// Number of rows stored for the fingerprint, expired ones included
    async fn count_entries(&self, fingerprint: &str) -> Result<usize>;
}

// =============================================================================
// RECORD STORE
// =============================================================================

/// Everything the analytics and forecast engines read and write.
pub trait RecordStore:
    ArrivalRepository + OccupancyRepository + EconomicRepository + ForecastRepository
{
}

impl<T> RecordStore for T where
    T: ArrivalRepository + OccupancyRepository + EconomicRepository + ForecastRepository
{
}
