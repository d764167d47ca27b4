//! # GraphQL Mutation Resolver
//!
//! Model training and forecast regeneration.

use async_graphql::{Context, Object, Result, ResultExt};
use tourism_domain::Island;

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::resolvers::query::day_count;
use crate::schema::*;

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Fit a model for every island on its full daily history.
    ///
    /// Islands without enough history keep using the seasonal baseline.
    #[graphql(name = "trainModels")]
    async fn train_models(&self, ctx: &Context<'_>) -> Result<TrainingReport> {
        let api_ctx = ctx.data::<ApiContext>()?;

        tracing::info!("Training forecast models");
        let trained = api_ctx.forecast.train_all_models().await;
        let skipped = Island::ALL
            .iter()
            .map(Island::as_str)
            .filter(|island| !trained.iter().any(|t| t == island))
            .map(String::from)
            .collect();

        Ok(TrainingReport { trained, skipped })
    }

    /// Regenerate and persist forecasts for every island
    #[graphql(name = "refreshForecasts")]
    async fn refresh_forecasts(
        &self,
        ctx: &Context<'_>,
        // Forecast horizon in days (default: 90)
        #[graphql(default = 90, validator(minimum = 1, maximum = 730))]
        horizon_days: i32,
    ) -> Result<Vec<RefreshSummary>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let horizon = day_count("horizonDays", horizon_days).extend()?;

        let produced = api_ctx
            .forecast
            .refresh_forecasts(horizon)
            .await
            .map_err(ApiError::from)
            .extend()?;

        Ok(produced
            .into_iter()
            .map(|(location, days)| RefreshSummary {
                location,
                days: i32::try_from(days).unwrap_or(i32::MAX),
            })
            .collect())
    }
}
