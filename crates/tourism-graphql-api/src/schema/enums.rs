//! # GraphQL Enum Types

use async_graphql::Enum;
use tourism_domain as domain;

/// Metric category of an analytics request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    /// Visitor arrival counts
    Arrivals,
    /// Hotel occupancy and daily rates
    Occupancy,
    /// Visitor spending from economic indicators
    Spending,
}

impl From<Metric> for domain::Metric {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Arrivals => Self::Arrivals,
            Metric::Occupancy => Self::Occupancy,
            Metric::Spending => Self::Spending,
        }
    }
}

/// Time bucket for grouped series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Day,
    Month,
}

impl From<Granularity> for domain::Granularity {
    fn from(g: Granularity) -> Self {
        match g {
            Granularity::Day => Self::Day,
            Granularity::Month => Self::Month,
        }
    }
}

impl From<domain::Granularity> for Granularity {
    fn from(g: domain::Granularity) -> Self {
        match g {
            domain::Granularity::Day => Self::Day,
            domain::Granularity::Month => Self::Month,
        }
    }
}
