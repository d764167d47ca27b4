//! # Tourism Analytics
//!
//! Query engine for tourism metrics. Turns an [`AnalyticsRequest`] into
//! grouped aggregates over arrivals, occupancy and visitor spending, derives
//! plain-language insights, and memoizes each result under a SHA-256
//! fingerprint of the normalized request.
//!
//! ## Features
//!
//! - Day or month grouping with optional location filtering
//! - Append-only result cache with lazy expiry
//! - Dashboard queries: month-over-month and year-over-year arrivals,
//!   seasonality, origin markets, trends, island comparison, economic
//!   correlation
//!
//! [`AnalyticsRequest`]: tourism_domain::AnalyticsRequest

#![forbid(unsafe_code)]
#![warn(clippy::all, missing_docs)]

pub mod engine;
pub mod error;
pub mod insights;
pub mod queries;

pub use engine::{
    AnalyticsConfig, AnalyticsEngine, AnalyticsResult, ArrivalsBlock, MetricData, OccupancyBlock,
    SpendingBlock, SpendingPoint, SpendingSummary, Trend, fingerprint,
};
pub use error::{AnalyticsError, Result};
pub use queries::{
    DashboardMetrics, EconomicCorrelation, EconomicPoint, LocationSnapshot, MonthAverage,
    OriginMarket, Seasonality,
};
