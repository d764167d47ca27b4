//! Business-facing views over a forecast: previews and impact estimates.

use serde::{Deserialize, Serialize};
use tourism_domain::{BusinessType, DailyForecast};

use crate::engine::ForecastEngine;
use crate::error::Result;

/// Days shown in a forecast preview.
pub const PREVIEW_DAYS: usize = 7;

/// Horizon of a business impact estimate.
pub const IMPACT_HORIZON_DAYS: usize = 30;

const HIGH_VOLUME_DAILY_AVERAGE: f64 = 10_000.0;

/// Truncated forecast offered before full access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPreview {
    pub location: String,
    pub period: String,
    pub forecast: Vec<DailyForecast>,
    pub message: String,
}

/// Estimated customers and revenue for a business category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub period: String,
    pub location: String,
    pub business_type: BusinessType,
    pub predicted_visitors: i64,
    pub estimated_customers: i64,
    pub estimated_revenue: i64,
    pub confidence: String,
    pub recommendations: Vec<String>,
}

/// Share of visitors who become customers and their average spend.
#[must_use]
pub const fn impact_factors(business_type: BusinessType) -> (f64, i64) {
    match business_type {
        BusinessType::Hotel => (0.4, 250),
        BusinessType::Restaurant => (0.7, 50),
        BusinessType::TourOperator => (0.3, 150),
        BusinessType::Retail => (0.5, 80),
        BusinessType::Transportation => (0.6, 40),
        BusinessType::Other => (0.5, 100),
    }
}

/// Recommendations for a category given its forecast.
#[must_use]
pub fn recommendations(business_type: BusinessType, forecast: &[DailyForecast]) -> Vec<String> {
    let mut out = Vec::new();

    let mut peak: Vec<&DailyForecast> = forecast.iter().collect();
    peak.sort_by(|a, b| b.predicted_arrivals.cmp(&a.predicted_arrivals));
    let peak_dates: Vec<String> = peak
        .iter()
        .take(5)
        .map(|d| d.date.format("%B %d").to_string())
        .collect();
    out.push(format!("Peak visitor days expected: {}", peak_dates.join(", ")));

    let tips: &[&str] = match business_type {
        BusinessType::Hotel => &[
            "Consider dynamic pricing for peak periods",
            "Ensure adequate staffing for high-occupancy dates",
        ],
        BusinessType::Restaurant => &[
            "Stock up on inventory for peak days",
            "Consider extended hours during high-traffic periods",
        ],
        BusinessType::TourOperator => &[
            "Add extra tour slots for peak days",
            "Hire seasonal guides if needed",
        ],
        _ => &[],
    };
    out.extend(tips.iter().map(ToString::to_string));

    if !forecast.is_empty() {
        let total: i64 = forecast.iter().map(|d| d.predicted_arrivals).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = total as f64 / forecast.len() as f64;
        if average > HIGH_VOLUME_DAILY_AVERAGE {
            out.push("High visitor volume expected - prepare marketing campaigns".to_string());
        }
    }

    out
}

/// Impact estimate from a forecast.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn business_impact(
    location: &str,
    business_type: BusinessType,
    forecast: &[DailyForecast],
) -> BusinessImpact {
    let predicted_visitors: i64 = forecast.iter().map(|d| d.predicted_arrivals).sum();
    let (visitor_ratio, average_spend) = impact_factors(business_type);
    let estimated_customers = (predicted_visitors as f64 * visitor_ratio) as i64;

    BusinessImpact {
        period: format!("Next {IMPACT_HORIZON_DAYS} days"),
        location: location.to_string(),
        business_type,
        predicted_visitors,
        estimated_customers,
        estimated_revenue: estimated_customers * average_spend,
        confidence: "Medium".to_string(),
        recommendations: recommendations(business_type, forecast),
    }
}

impl ForecastEngine {
    /// First week of a forecast with the access teaser.
    pub async fn forecast_preview(&self, location: &str, horizon_days: usize) -> Result<ForecastPreview> {
        let mut forecast = self.generate_forecast(location, horizon_days).await?;
        forecast.truncate(PREVIEW_DAYS);

        Ok(ForecastPreview {
            location: location.to_string(),
            period: format!("Next {horizon_days} days"),
            forecast,
            message: "Full forecast available with premium access".to_string(),
        })
    }

    /// 30-day visitor, customer and revenue estimate for a business category.
    pub async fn calculate_business_impact(
        &self,
        location: &str,
        business_type: BusinessType,
    ) -> Result<BusinessImpact> {
        let forecast = self.generate_forecast(location, IMPACT_HORIZON_DAYS).await?;
        Ok(business_impact(location, business_type, &forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ForecastConfig;
    use chrono::{Duration, NaiveDate};
    use std::sync::Arc;
    use tourism_domain::FixedClock;
    use tourism_persistence::DuckDbStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_forecast(start: NaiveDate, values: &[i64]) -> Vec<DailyForecast> {
        values
            .iter()
            .zip(0..)
            .map(|(&v, i)| DailyForecast::bounded(start + Duration::days(i), "Oahu", v, v, v))
            .collect()
    }

    #[test]
    fn test_factor_table() {
        assert_eq!(impact_factors(BusinessType::Hotel), (0.4, 250));
        assert_eq!(impact_factors(BusinessType::Transportation), (0.6, 40));
        assert_eq!(impact_factors("surf_school".parse().unwrap()), (0.5, 100));
    }

    #[test]
    fn test_hotel_impact() {
        let forecast = flat_forecast(date(2024, 3, 1), &[1000; 30]);
        let impact = business_impact("Oahu", BusinessType::Hotel, &forecast);

        assert_eq!(impact.predicted_visitors, 30_000);
        assert_eq!(impact.estimated_customers, 12_000);
        assert_eq!(impact.estimated_revenue, 3_000_000);
        assert_eq!(impact.period, "Next 30 days");
        assert_eq!(impact.confidence, "Medium");
        assert_eq!(impact.recommendations.len(), 3);
        assert_eq!(
            impact.recommendations[1],
            "Consider dynamic pricing for peak periods"
        );
    }

    #[test]
    fn test_peak_days_and_high_volume() {
        let mut values = vec![12_000; 10];
        values[3] = 20_000;
        values[7] = 19_000;
        let forecast = flat_forecast(date(2024, 12, 1), &values);

        let recs = recommendations(BusinessType::Retail, &forecast);
        assert_eq!(
            recs[0],
            "Peak visitor days expected: December 04, December 08, December 01, December 02, December 03"
        );
        assert_eq!(
            recs.last().unwrap(),
            "High visitor volume expected - prepare marketing campaigns"
        );
        assert_eq!(recs.len(), 2);
    }

    #[tokio::test]
    async fn test_preview_truncates_to_a_week() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        let engine = ForecastEngine::new(
            store,
            Arc::new(FixedClock::at_date(date(2024, 5, 1))),
            ForecastConfig {
                jitter_seed: Some(3),
                ..ForecastConfig::default()
            },
        );

        let preview = engine.forecast_preview("Maui", 30).await.unwrap();
        assert_eq!(preview.forecast.len(), 7);
        assert_eq!(preview.period, "Next 30 days");
        assert_eq!(preview.message, "Full forecast available with premium access");
        assert_eq!(preview.forecast[0].date, date(2024, 5, 1));

        let impact = engine
            .calculate_business_impact("Maui", BusinessType::TourOperator)
            .await
            .unwrap();
        assert!(impact.predicted_visitors > 0);
        assert_eq!(impact.recommendations[2], "Hire seasonal guides if needed");
    }
}
