//! # GraphQL Query Resolver
//!
//! Read operations for the tourism analytics API.

use async_graphql::{Context, Json, Object, Result, ResultExt};
use tourism_analytics::AnalyticsResult;
use tourism_domain::{AnalyticsRequest, BusinessType};
use tourism_persistence::ForecastRepository;

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::schema::*;

/// Validated day count from a GraphQL integer argument
pub(crate) fn day_count(name: &str, value: i32) -> Result<usize, ApiError> {
    usize::try_from(value)
        .ok()
        .filter(|&days| days > 0)
        .ok_or_else(|| ApiError::InvalidInput(format!("{name} must be positive, got {value}")))
}

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    // =========================================================================
    // ANALYTICS
    // =========================================================================

    /// Grouped arrivals, occupancy and spending with insights.
    ///
    /// Identical requests within the cache TTL return the memoized result.
    async fn analytics(&self, ctx: &Context<'_>, input: AnalyticsInput) -> Result<Json<AnalyticsResult>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let request = AnalyticsRequest::from(input);

        tracing::debug!(
            start = %request.start_date,
            end = %request.end_date,
            locations = ?request.locations,
            "Processing analytics query"
        );

        let result = api_ctx
            .analytics
            .process_query(&request)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(Json(result))
    }

    // =========================================================================
    // FORECASTS
    // =========================================================================

    /// First week of a visitor forecast for a location
    #[graphql(name = "forecastPreview")]
    async fn forecast_preview(
        &self,
        ctx: &Context<'_>,
        location: String,
        // Forecast horizon in days (default: 30, max: 730)
        #[graphql(default = 30, validator(minimum = 1, maximum = 730))]
        horizon_days: i32,
    ) -> Result<ForecastPreview> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let horizon = day_count("horizonDays", horizon_days).extend()?;

        let preview = api_ctx
            .forecast
            .forecast_preview(&location, horizon)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(preview.into())
    }

    /// 30-day visitor, customer and revenue projection for a business
    #[graphql(name = "businessImpact")]
    async fn business_impact(
        &self,
        ctx: &Context<'_>,
        location: String,
        // hotel, restaurant, tour_operator, retail, transportation; anything
        // else is treated as "other"
        business_type: String,
    ) -> Result<BusinessImpact> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let business_type = business_type
            .parse::<BusinessType>()
            .unwrap_or(BusinessType::Other);

        let impact = api_ctx
            .forecast
            .calculate_business_impact(&location, business_type)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(impact.into())
    }

    /// Forecast rows previously generated for a location, newest issue first
    #[graphql(name = "forecastHistory")]
    async fn forecast_history(
        &self,
        ctx: &Context<'_>,
        location: String,
        #[graphql(default = 90, validator(minimum = 1, maximum = 1000))]
        limit: i32,
    ) -> Result<Vec<ForecastHistoryEntry>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let limit = day_count("limit", limit).extend()?;

        let rows = api_ctx
            .store
            .forecast_history(&location, limit)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(rows.into_iter().map(ForecastHistoryEntry::from).collect())
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    #[graphql(name = "dashboardMetrics")]
    async fn dashboard_metrics(&self, ctx: &Context<'_>) -> Result<DashboardMetrics> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let metrics = api_ctx
            .analytics
            .dashboard_metrics()
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(metrics.into())
    }

    /// Average arrivals per calendar month for a location
    async fn seasonality(&self, ctx: &Context<'_>, location: String) -> Result<Seasonality> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let seasonality = api_ctx
            .analytics
            .seasonality(&location)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(seasonality.into())
    }

    /// Origin markets over a range (default: last 30 days)
    #[graphql(name = "originAnalysis")]
    async fn origin_analysis(
        &self,
        ctx: &Context<'_>,
        range: Option<DateRangeInput>,
    ) -> Result<Vec<OriginMarket>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let range = range.map(DateRangeInput::to_range).transpose().extend()?;

        let markets = api_ctx
            .analytics
            .origin_analysis(range)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(markets.into_iter().map(OriginMarket::from).collect())
    }

    /// Daily arrival totals over the last `days` days
    #[graphql(name = "visitorTrends")]
    async fn visitor_trends(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 30, validator(minimum = 1, maximum = 3650))]
        days: i32,
        location: Option<String>,
    ) -> Result<Vec<DailyArrivals>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let trend = api_ctx
            .analytics
            .visitor_trends(i64::from(days), location.as_deref())
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(trend.into_iter().map(DailyArrivals::from).collect())
    }

    /// Daily occupancy averages over the last `days` days
    #[graphql(name = "occupancyTrends")]
    async fn occupancy_trends(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 30, validator(minimum = 1, maximum = 3650))]
        days: i32,
        location: Option<String>,
    ) -> Result<Vec<DailyOccupancy>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let trend = api_ctx
            .analytics
            .occupancy_trends(i64::from(days), location.as_deref())
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(trend.into_iter().map(DailyOccupancy::from).collect())
    }

    /// Month-to-date arrivals and occupancy per island
    #[graphql(name = "locationComparison")]
    async fn location_comparison(&self, ctx: &Context<'_>) -> Result<Vec<LocationSnapshot>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let snapshots = api_ctx
            .analytics
            .location_comparison()
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(snapshots.into_iter().map(LocationSnapshot::from).collect())
    }

    /// Latest economic indicators next to monthly arrivals
    #[graphql(name = "economicCorrelation")]
    async fn economic_correlation(&self, ctx: &Context<'_>) -> Result<EconomicCorrelation> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let correlation = api_ctx
            .analytics
            .economic_correlation()
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(correlation.into())
    }

    /// API version
    async fn version(&self) -> &'static str {
        crate::VERSION
    }
}
