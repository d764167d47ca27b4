//! # GraphQL Output Types
//!
//! Object types for dashboard and forecast responses. Full analytics
//! results are returned as a JSON scalar in their cached shape.

use async_graphql::{ID, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use tourism_analytics as analytics;
use tourism_domain::{DailyForecast, ForecastRecord};
use tourism_forecast as forecast;
use tourism_persistence as persistence;

// =============================================================================
// FORECAST TYPES
// =============================================================================

/// One forecast day with its confidence band
#[derive(Debug, Clone, SimpleObject)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub location: String,
    pub predicted_arrivals: i64,
    pub confidence_lower: i64,
    pub confidence_upper: i64,
}

impl From<DailyForecast> for ForecastDay {
    fn from(d: DailyForecast) -> Self {
        Self {
            date: d.date,
            location: d.location,
            predicted_arrivals: d.predicted_arrivals,
            confidence_lower: d.confidence_lower,
            confidence_upper: d.confidence_upper,
        }
    }
}

/// First week of a forecast
#[derive(Debug, Clone, SimpleObject)]
pub struct ForecastPreview {
    pub location: String,
    /// Requested horizon, e.g. "Next 30 days"
    pub period: String,
    pub forecast: Vec<ForecastDay>,
    pub message: String,
}

impl From<forecast::ForecastPreview> for ForecastPreview {
    fn from(p: forecast::ForecastPreview) -> Self {
        Self {
            location: p.location,
            period: p.period,
            forecast: p.forecast.into_iter().map(ForecastDay::from).collect(),
            message: p.message,
        }
    }
}

/// Projected customers and revenue for a business category
#[derive(Debug, Clone, SimpleObject)]
pub struct BusinessImpact {
    pub period: String,
    pub location: String,
    /// Normalized category; unknown categories report "other"
    pub business_type: String,
    pub predicted_visitors: i64,
    pub estimated_customers: i64,
    /// Estimated revenue in dollars
    pub estimated_revenue: i64,
    pub confidence: String,
    pub recommendations: Vec<String>,
}

impl From<forecast::BusinessImpact> for BusinessImpact {
    fn from(b: forecast::BusinessImpact) -> Self {
        Self {
            period: b.period,
            location: b.location,
            business_type: b.business_type.as_str().to_string(),
            predicted_visitors: b.predicted_visitors,
            estimated_customers: b.estimated_customers,
            estimated_revenue: b.estimated_revenue,
            confidence: b.confidence,
            recommendations: b.recommendations,
        }
    }
}

/// Persisted forecast row
#[derive(Debug, Clone, SimpleObject)]
pub struct ForecastHistoryEntry {
    pub id: ID,
    pub issue_date: NaiveDate,
    pub target_date: NaiveDate,
    pub location: String,
    pub predicted_count: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
    /// "mstl", "ets" or "baseline"
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ForecastRecord> for ForecastHistoryEntry {
    fn from(r: ForecastRecord) -> Self {
        Self {
            id: ID(r.id.to_string()),
            issue_date: r.forecast_issue_date,
            target_date: r.target_date,
            location: r.location,
            predicted_count: r.predicted_count,
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            model_name: r.model_name,
            created_at: r.created_at,
        }
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, SimpleObject)]
pub struct TrainingReport {
    /// Locations with a freshly trained model
    pub trained: Vec<String>,
    /// Locations left on the baseline
    pub skipped: Vec<String>,
}

/// Days regenerated for one location
#[derive(Debug, Clone, SimpleObject)]
pub struct RefreshSummary {
    pub location: String,
    pub days: i32,
}

// =============================================================================
// DASHBOARD TYPES
// =============================================================================

/// Arrivals from one origin market
#[derive(Debug, Clone, SimpleObject)]
pub struct OriginTotal {
    pub origin: String,
    pub arrivals: i64,
}

impl From<persistence::OriginTotal> for OriginTotal {
    fn from(o: persistence::OriginTotal) -> Self {
        Self {
            origin: o.origin,
            arrivals: o.arrivals,
        }
    }
}

/// Average occupancy for one location
#[derive(Debug, Clone, SimpleObject)]
pub struct LocationOccupancy {
    pub location: String,
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
}

impl From<persistence::LocationOccupancy> for LocationOccupancy {
    fn from(o: persistence::LocationOccupancy) -> Self {
        Self {
            location: o.location,
            occupancy_rate: o.occupancy_rate,
            average_daily_rate: o.average_daily_rate,
        }
    }
}

/// Headline dashboard numbers
#[derive(Debug, Clone, SimpleObject)]
pub struct DashboardMetrics {
    pub current_month_arrivals: i64,
    pub previous_month_arrivals: i64,
    /// Percent against the same period last year
    pub year_over_year_growth: f64,
    pub year_to_date_arrivals: i64,
    pub top_origins: Vec<OriginTotal>,
    pub occupancy_by_location: Vec<LocationOccupancy>,
}

impl From<analytics::DashboardMetrics> for DashboardMetrics {
    fn from(m: analytics::DashboardMetrics) -> Self {
        Self {
            current_month_arrivals: m.current_month_arrivals,
            previous_month_arrivals: m.previous_month_arrivals,
            year_over_year_growth: m.year_over_year_growth,
            year_to_date_arrivals: m.year_to_date_arrivals,
            top_origins: m.top_origins.into_iter().map(OriginTotal::from).collect(),
            occupancy_by_location: m
                .occupancy_by_location
                .into_iter()
                .map(LocationOccupancy::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct MonthAverage {
    pub month: String,
    pub average_arrivals: i64,
}

/// Monthly profile of a location
#[derive(Debug, Clone, SimpleObject)]
pub struct Seasonality {
    pub location: String,
    pub monthly_averages: Vec<MonthAverage>,
    pub peak_month: Option<String>,
    pub low_month: Option<String>,
}

impl From<analytics::Seasonality> for Seasonality {
    fn from(s: analytics::Seasonality) -> Self {
        Self {
            location: s.location,
            monthly_averages: s
                .monthly_averages
                .into_iter()
                .map(|m| MonthAverage {
                    month: m.month,
                    average_arrivals: m.average_arrivals,
                })
                .collect(),
            peak_month: s.peak_month,
            low_month: s.low_month,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct LocationArrivals {
    pub location: String,
    pub arrivals: i64,
}

/// Origin market with its per-location split
#[derive(Debug, Clone, SimpleObject)]
pub struct OriginMarket {
    pub origin: String,
    pub total_arrivals: i64,
    pub by_location: Vec<LocationArrivals>,
}

impl From<analytics::OriginMarket> for OriginMarket {
    fn from(m: analytics::OriginMarket) -> Self {
        Self {
            origin: m.origin,
            total_arrivals: m.total_arrivals,
            by_location: m
                .by_location
                .into_iter()
                .map(|(location, arrivals)| LocationArrivals { location, arrivals })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct DailyArrivals {
    pub date: NaiveDate,
    pub arrivals: i64,
}

impl From<persistence::DailyTotal> for DailyArrivals {
    fn from(d: persistence::DailyTotal) -> Self {
        Self {
            date: d.date,
            arrivals: d.arrivals,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct DailyOccupancy {
    pub date: NaiveDate,
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
}

impl From<persistence::DailyOccupancy> for DailyOccupancy {
    fn from(d: persistence::DailyOccupancy) -> Self {
        Self {
            date: d.date,
            occupancy_rate: d.occupancy_rate,
            average_daily_rate: d.average_daily_rate,
        }
    }
}

/// Month-to-date figures for one island
#[derive(Debug, Clone, SimpleObject)]
pub struct LocationSnapshot {
    pub location: String,
    pub arrivals: i64,
    pub occupancy_rate: f64,
    pub average_daily_rate: f64,
}

impl From<analytics::LocationSnapshot> for LocationSnapshot {
    fn from(s: analytics::LocationSnapshot) -> Self {
        Self {
            location: s.location,
            arrivals: s.arrivals,
            occupancy_rate: s.occupancy_rate,
            average_daily_rate: s.average_daily_rate,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct EconomicPoint {
    pub date: NaiveDate,
    pub unemployment_rate: f64,
    pub visitor_spending_millions: f64,
    pub gdp_growth_rate: Option<f64>,
    pub arrivals: i64,
}

/// Economic indicators joined with monthly arrivals
#[derive(Debug, Clone, SimpleObject)]
pub struct EconomicCorrelation {
    pub points: Vec<EconomicPoint>,
    /// Pearson coefficient of spending against arrivals
    pub spending_arrivals_correlation: Option<f64>,
}

impl From<analytics::EconomicCorrelation> for EconomicCorrelation {
    fn from(c: analytics::EconomicCorrelation) -> Self {
        Self {
            points: c
                .points
                .into_iter()
                .map(|p| EconomicPoint {
                    date: p.date,
                    unemployment_rate: p.unemployment_rate,
                    visitor_spending_millions: p.visitor_spending_millions,
                    gdp_growth_rate: p.gdp_growth_rate,
                    arrivals: p.arrivals,
                })
                .collect(),
            spending_arrivals_correlation: c.spending_arrivals_correlation,
        }
    }
}
