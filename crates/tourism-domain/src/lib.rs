//! # Tourism Analytics - Domain Model
//!
//! Core records, request types and forecast value objects for the tourism
//! analytics service. These types are shared by persistence, analytics,
//! forecasting and the API layer.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Mutex;
use uuid::Uuid;

// =============================================================================
// ENUMS
// =============================================================================

/// Hawaiian islands tracked by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Island {
    Oahu,
    Maui,
    Kauai,
    Hawaii,
    Molokai,
    Lanai,
}

impl Island {
    pub const ALL: [Self; 6] = [
        Self::Oahu,
        Self::Maui,
        Self::Kauai,
        Self::Hawaii,
        Self::Molokai,
        Self::Lanai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oahu => "Oahu",
            Self::Maui => "Maui",
            Self::Kauai => "Kauai",
            Self::Hawaii => "Hawaii",
            Self::Molokai => "Molokai",
            Self::Lanai => "Lanai",
        }
    }
}

impl FromStr for Island {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|island| island.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownLocation(s.to_string()))
    }
}

/// How visitors arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalType {
    #[default]
    Air,
    Cruise,
}

impl ArrivalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Cruise => "cruise",
        }
    }
}

impl FromStr for ArrivalType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "air" => Ok(Self::Air),
            "cruise" => Ok(Self::Cruise),
            other => Err(DomainError::InvalidRecord(format!(
                "unknown arrival type '{other}'"
            ))),
        }
    }
}

/// Metric categories an analytics request can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Arrivals,
    Occupancy,
    Spending,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::Arrivals, Self::Occupancy, Self::Spending];
}

/// Time bucket used when grouping records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Month,
}

/// Business categories used for impact estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Hotel,
    Restaurant,
    TourOperator,
    Retail,
    Transportation,
    #[serde(other)]
    Other,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Restaurant => "restaurant",
            Self::TourOperator => "tour_operator",
            Self::Retail => "retail",
            Self::Transportation => "transportation",
            Self::Other => "other",
        }
    }
}

impl FromStr for BusinessType {
    type Err = std::convert::Infallible;

    /// Unrecognized categories map to [`BusinessType::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "hotel" => Self::Hotel,
            "restaurant" => Self::Restaurant,
            "tour_operator" => Self::TourOperator,
            "retail" => Self::Retail,
            "transportation" => Self::Transportation,
            _ => Self::Other,
        })
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Daily visitor arrivals for a location, optionally split by origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub date: NaiveDate,
    pub location: String,
    pub origin: Option<String>,
    pub count: i64,
    #[serde(default)]
    pub arrival_type: ArrivalType,
}

impl ArrivalRecord {
    pub fn new(date: NaiveDate, location: impl Into<String>, count: i64) -> Self {
        Self {
            date,
            location: location.into(),
            origin: None,
            count,
            arrival_type: ArrivalType::Air,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.count < 0 {
            return Err(DomainError::InvalidRecord(format!(
                "arrival count must be non-negative, got {}",
                self.count
            )));
        }
        Ok(())
    }
}

/// Daily hotel occupancy for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    pub date: NaiveDate,
    pub location: String,
    /// Percentage, 0-100
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
    pub revenue_per_available_room: Option<f64>,
}

impl OccupancyRecord {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=100.0).contains(&self.occupancy_rate) {
            return Err(DomainError::InvalidRecord(format!(
                "occupancy rate must be within 0-100, got {}",
                self.occupancy_rate
            )));
        }
        Ok(())
    }
}

/// Monthly economic indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicRecord {
    pub date: NaiveDate,
    pub unemployment_rate: f64,
    pub visitor_spending_millions: f64,
    pub gdp_growth_rate: Option<f64>,
}

/// Persisted daily forecast row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: Uuid,
    pub forecast_issue_date: NaiveDate,
    pub target_date: NaiveDate,
    pub location: String,
    pub predicted_count: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

impl ForecastRecord {
    pub fn from_daily(
        daily: &DailyForecast,
        issue_date: NaiveDate,
        model_name: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            forecast_issue_date: issue_date,
            target_date: daily.date,
            location: daily.location.clone(),
            predicted_count: daily.predicted_arrivals,
            lower_bound: daily.confidence_lower,
            upper_bound: daily.confidence_upper,
            model_name: model_name.to_string(),
            created_at,
        }
    }
}

/// Memoized analytics result keyed by request fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: Uuid,
    pub fingerprint: String,
    /// Serialized JSON result, stored verbatim
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        fingerprint: impl Into<String>,
        payload: String,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            fingerprint: fingerprint.into(),
            payload,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    /// Entries are valid strictly before their expiry instant.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

// =============================================================================
// FORECAST VALUE OBJECTS
// =============================================================================

/// One forecast day with its confidence interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub location: String,
    pub predicted_arrivals: i64,
    pub confidence_lower: i64,
    pub confidence_upper: i64,
}

impl DailyForecast {
    /// Build a forecast day, clamping to zero and ordering the bounds
    /// around the prediction.
    pub fn bounded(
        date: NaiveDate,
        location: impl Into<String>,
        predicted: i64,
        lower: i64,
        upper: i64,
    ) -> Self {
        let predicted = predicted.max(0);
        Self {
            date,
            location: location.into(),
            predicted_arrivals: predicted,
            confidence_lower: lower.max(0).min(predicted),
            confidence_upper: upper.max(predicted),
        }
    }

    #[must_use]
    pub fn is_well_ordered(&self) -> bool {
        0 <= self.confidence_lower
            && self.confidence_lower <= self.predicted_arrivals
            && self.predicted_arrivals <= self.confidence_upper
    }
}

// =============================================================================
// QUERY/FILTER TYPES
// =============================================================================

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending on (and including) `end`.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Filter shared by all record queries: a date range plus an optional
/// location set (empty means every location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub range: DateRange,
    pub locations: Vec<String>,
}

impl RecordFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            locations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn matches_location(&self, location: &str) -> bool {
        self.locations.is_empty() || self.locations.iter().any(|l| l == location)
    }
}

fn default_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

/// Declarative analytics query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub group_by: Granularity,
}

impl AnalyticsRequest {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            locations: Vec::new(),
            metrics: default_metrics(),
            group_by: Granularity::default(),
        }
    }

    #[must_use]
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics = metrics.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn grouped_by(mut self, granularity: Granularity) -> Self {
        self.group_by = granularity;
        self
    }

    /// Sorted, de-duplicated copy. Locations and metrics are sets, so two
    /// requests that differ only in list order normalize to the same value.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut locations = self.locations.clone();
        locations.sort();
        locations.dedup();
        let mut metrics = self.metrics.clone();
        metrics.sort();
        metrics.dedup();
        Self {
            start_date: self.start_date,
            end_date: self.end_date,
            locations,
            metrics,
            group_by: self.group_by,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        DateRange::new(self.start_date, self.end_date).map(|_| ())
    }

    #[must_use]
    pub fn includes(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Record filter for this request. Callers validate first.
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            range: DateRange {
                start: self.start_date,
                end: self.end_date,
            },
            locations: self.locations.clone(),
        }
    }
}

// =============================================================================
// CALENDAR HELPERS
// =============================================================================

/// Peak (Dec-Feb) and shoulder (Jun-Aug) visitor seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Peak,
    Shoulder,
    Regular,
}

impl Season {
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            12 | 1 | 2 => Self::Peak,
            6..=8 => Self::Shoulder,
            _ => Self::Regular,
        }
    }
}

#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First day of the month containing `date`.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

// =============================================================================
// CLOCK
// =============================================================================

/// Source of "now" for cache expiry and forecast dating.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock, useful for expiry tests and replaying pipelines.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock set to midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::address::en::StateName;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalized_request_ignores_list_order() {
        let a = AnalyticsRequest::new(date(2024, 1, 1), date(2024, 1, 31))
            .with_locations(["Maui", "Oahu", "Maui"])
            .with_metrics([Metric::Spending, Metric::Arrivals]);
        let b = AnalyticsRequest::new(date(2024, 1, 1), date(2024, 1, 31))
            .with_locations(["Oahu", "Maui"])
            .with_metrics([Metric::Arrivals, Metric::Spending]);

        assert_eq!(a.normalized(), b.normalized());
        assert_eq!(a.normalized().locations, vec!["Maui", "Oahu"]);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: AnalyticsRequest =
            serde_json::from_str(r#"{"start_date":"2024-01-01","end_date":"2024-02-01"}"#)
                .unwrap();
        assert_eq!(req.metrics, Metric::ALL.to_vec());
        assert_eq!(req.group_by, Granularity::Month);
        assert!(req.locations.is_empty());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let req = AnalyticsRequest::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(
            req.validate(),
            Err(DomainError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_arrival_validation() {
        let origin: String = StateName().fake();
        let count: i64 = (0..10_000).fake();
        let ok = ArrivalRecord::new(date(2024, 1, 1), "Oahu", count).with_origin(origin);
        assert!(ok.validate().is_ok());

        let bad = ArrivalRecord::new(date(2024, 1, 1), "Oahu", -1);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_occupancy_validation() {
        let mut rec = OccupancyRecord {
            date: date(2024, 1, 1),
            location: "Maui".to_string(),
            occupancy_rate: 100.0,
            average_daily_rate: 320.0,
            revenue_per_available_room: None,
        };
        assert!(rec.validate().is_ok());
        rec.occupancy_rate = 100.5;
        assert!(rec.validate().is_err());
    }

    #[test]
    fn test_bounded_forecast_orders_values() {
        let day = DailyForecast::bounded(date(2024, 1, 1), "Oahu", 100, 130, -5);
        assert!(day.is_well_ordered());
        assert_eq!(day.confidence_lower, 100);
        assert_eq!(day.confidence_upper, 100);

        let negative = DailyForecast::bounded(date(2024, 1, 1), "Oahu", -20, -30, -10);
        assert_eq!(negative.predicted_arrivals, 0);
        assert!(negative.is_well_ordered());
    }

    #[test]
    fn test_cache_entry_expiry() {
        let now = Utc::now();
        let entry = CacheEntry::new("abc", "{}".to_string(), now, Duration::hours(1));
        assert!(entry.is_valid_at(now));
        assert!(!entry.is_valid_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_seasons_and_weekends() {
        assert_eq!(Season::of(date(2024, 12, 5)), Season::Peak);
        assert_eq!(Season::of(date(2024, 7, 5)), Season::Shoulder);
        assert_eq!(Season::of(date(2024, 4, 5)), Season::Regular);
        assert!(is_weekend(date(2024, 1, 6)));
        assert!(!is_weekend(date(2024, 1, 8)));
    }

    #[test]
    fn test_business_type_parsing() {
        assert_eq!("hotel".parse::<BusinessType>().unwrap(), BusinessType::Hotel);
        assert_eq!("surf_shop".parse::<BusinessType>().unwrap(), BusinessType::Other);
        assert_eq!("oahu".parse::<Island>().unwrap(), Island::Oahu);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::at_date(date(2024, 3, 1));
        clock.advance(Duration::days(2));
        assert_eq!(clock.today(), date(2024, 3, 3));
    }
}
