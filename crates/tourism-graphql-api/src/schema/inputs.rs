//! # GraphQL Input Types

use async_graphql::InputObject;
use chrono::NaiveDate;
use tourism_domain::{self as domain, AnalyticsRequest, DateRange};

use super::enums::{Granularity, Metric};
use crate::error::ApiResult;

/// Analytics query
#[derive(Debug, Clone, InputObject)]
pub struct AnalyticsInput {
    /// First day of the range (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive)
    pub end_date: NaiveDate,
    /// Locations to include; all when empty or omitted
    #[graphql(default)]
    pub locations: Vec<String>,
    /// Metrics to compute; all when omitted
    pub metrics: Option<Vec<Metric>>,
    /// Grouping for time series (default: MONTH)
    pub group_by: Option<Granularity>,
}

impl From<AnalyticsInput> for AnalyticsRequest {
    fn from(input: AnalyticsInput) -> Self {
        let mut request =
            Self::new(input.start_date, input.end_date).with_locations(input.locations);
        if let Some(metrics) = input.metrics {
            request = request.with_metrics(metrics.into_iter().map(domain::Metric::from));
        }
        if let Some(group_by) = input.group_by {
            request = request.grouped_by(group_by.into());
        }
        request
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, InputObject)]
pub struct DateRangeInput {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRangeInput {
    /// Validated domain range
    pub fn to_range(self) -> ApiResult<DateRange> {
        Ok(DateRange::new(self.start, self.end)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults_cover_all_metrics_by_month() {
        let request = AnalyticsRequest::from(AnalyticsInput {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            locations: Vec::new(),
            metrics: None,
            group_by: None,
        });

        assert_eq!(request.metrics, domain::Metric::ALL.to_vec());
        assert_eq!(request.group_by, domain::Granularity::Month);
    }

    #[test]
    fn test_explicit_selection() {
        let request = AnalyticsRequest::from(AnalyticsInput {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            locations: vec!["Maui".into()],
            metrics: Some(vec![Metric::Spending]),
            group_by: Some(Granularity::Day),
        });

        assert_eq!(request.locations, vec!["Maui".to_string()]);
        assert_eq!(request.metrics, vec![domain::Metric::Spending]);
        assert_eq!(request.group_by, domain::Granularity::Day);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let range = DateRangeInput {
            start: date(2024, 2, 1),
            end: date(2024, 1, 1),
        };
        assert!(range.to_range().is_err());
    }
}
