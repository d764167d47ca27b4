//! # API Context
//!
//! Engines and stores shared by all GraphQL resolvers.

use std::sync::Arc;

use tourism_analytics::{AnalyticsConfig, AnalyticsEngine};
use tourism_domain::{Clock, SystemClock};
use tourism_forecast::{ForecastConfig, ForecastEngine};
use tourism_persistence::{
    CacheConfig, DuckDbStore, QueryCacheRepository, RecordStore, RedisQueryCache,
};

use crate::config::{CacheBackend, Config};
use crate::error::{ApiError, ApiResult};

/// Application context shared across all GraphQL resolvers
#[derive(Clone)]
pub struct ApiContext {
    /// Analytics query engine
    pub analytics: Arc<AnalyticsEngine>,

    /// Forecast engine
    pub forecast: Arc<ForecastEngine>,

    /// Record store, for direct history reads
    pub store: Arc<dyn RecordStore>,
}

impl ApiContext {
    /// Create a context over shared dependencies
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn QueryCacheRepository>,
        clock: Arc<dyn Clock>,
        analytics_config: AnalyticsConfig,
        forecast_config: ForecastConfig,
    ) -> Self {
        let analytics = Arc::new(AnalyticsEngine::new(
            Arc::clone(&store),
            cache,
            Arc::clone(&clock),
            analytics_config,
        ));
        let forecast = Arc::new(ForecastEngine::new(Arc::clone(&store), clock, forecast_config));

        Self {
            analytics,
            forecast,
            store,
        }
    }

    /// Open the configured store and cache backend
    pub async fn connect(config: &Config) -> ApiResult<Self> {
        let store = Arc::new(match &config.database_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Opening DuckDB store");
                DuckDbStore::open(path)?
            }
            None => {
                tracing::warn!("DATABASE_PATH not set, using an in-memory store");
                DuckDbStore::open_in_memory()?
            }
        });

        let cache: Arc<dyn QueryCacheRepository> = match config.cache_backend {
            CacheBackend::DuckDb => Arc::clone(&store) as Arc<dyn QueryCacheRepository>,
            CacheBackend::Redis => {
                tracing::info!(url = %config.redis_url, "Connecting to Redis");
                let cache_config = CacheConfig {
                    url: config.redis_url.clone(),
                    ..CacheConfig::default()
                };
                Arc::new(RedisQueryCache::new(cache_config).await?)
            }
        };

        ApiContextBuilder::new()
            .with_store(store)
            .with_cache(cache)
            .with_analytics_config(config.analytics())
            .with_forecast_config(config.forecast())
            .build()
    }
}

/// Builder for ApiContext
#[derive(Default)]
pub struct ApiContextBuilder {
    store: Option<Arc<dyn RecordStore>>,
    cache: Option<Arc<dyn QueryCacheRepository>>,
    clock: Option<Arc<dyn Clock>>,
    analytics_config: AnalyticsConfig,
    forecast_config: ForecastConfig,
}

impl ApiContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn QueryCacheRepository>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub const fn with_analytics_config(mut self, config: AnalyticsConfig) -> Self {
        self.analytics_config = config;
        self
    }

    #[must_use]
    pub fn with_forecast_config(mut self, config: ForecastConfig) -> Self {
        self.forecast_config = config;
        self
    }

    /// Build the context. The clock defaults to the system clock.
    pub fn build(self) -> ApiResult<ApiContext> {
        let store = self
            .store
            .ok_or_else(|| ApiError::InvalidConfig("record store required".into()))?;
        let cache = self
            .cache
            .ok_or_else(|| ApiError::InvalidConfig("query cache required".into()))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(ApiContext::new(
            store,
            cache,
            clock,
            self.analytics_config,
            self.forecast_config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_store_and_cache() {
        assert!(matches!(
            ApiContextBuilder::new().build(),
            Err(ApiError::InvalidConfig(_))
        ));

        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        let built = ApiContextBuilder::new()
            .with_store(store.clone())
            .with_cache(store)
            .build();
        assert!(built.is_ok());
    }

    #[tokio::test]
    async fn test_connect_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: Some(dir.path().join("tourism.duckdb")),
            model_dir: dir.path().join("models"),
            ..Config::from_lookup(|_| None).unwrap()
        };

        let ctx = ApiContext::connect(&config).await.unwrap();
        assert!(ctx.forecast.registry().locations().is_empty());
        assert!(dir.path().join("tourism.duckdb").exists());
    }
}
