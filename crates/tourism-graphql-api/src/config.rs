//! # API Configuration
//!
//! Environment-based configuration for the GraphQL API service.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tourism_analytics::AnalyticsConfig;
use tourism_forecast::{FillTriple, ForecastConfig};

use crate::error::{ApiError, ApiResult};

/// Where memoized analytics results are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// Cache table inside the DuckDB store
    #[default]
    DuckDb,
    /// Redis lists keyed by fingerprint
    Redis,
}

impl FromStr for CacheBackend {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Self::DuckDb),
            "redis" => Ok(Self::Redis),
            other => Err(ApiError::InvalidConfig(format!(
                "CACHE_BACKEND must be 'duckdb' or 'redis', got '{other}'"
            ))),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// DuckDB file; in-memory when unset
    pub database_path: Option<PathBuf>,

    /// Analytics cache backend
    pub cache_backend: CacheBackend,

    /// Redis URL, used with [`CacheBackend::Redis`]
    pub redis_url: String,

    /// Lifetime of a cached analytics result
    pub analytics_cache_ttl: Duration,

    /// Directory for model snapshots
    pub model_dir: PathBuf,

    /// Padding for days past a model's reach
    pub forecast_fill: FillTriple,

    /// Enable GraphQL Playground
    pub enable_playground: bool,

    /// Maximum query depth
    pub max_query_depth: usize,

    /// Maximum query complexity
    pub max_query_complexity: usize,

    /// Logging level
    pub log_level: String,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str, default: i64| -> ApiResult<i64> {
            lookup(key).map_or(Ok(default), |v| {
                v.parse()
                    .map_err(|_| ApiError::InvalidConfig(format!("{key} must be an integer, got '{v}'")))
            })
        };

        let server_addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let server_addr = server_addr
            .parse()
            .map_err(|_| ApiError::InvalidConfig(format!("invalid SERVER_ADDR '{server_addr}'")))?;

        let cache_backend = lookup("CACHE_BACKEND")
            .map_or(Ok(CacheBackend::default()), |v| v.parse())?;

        let ttl_secs = u64::try_from(parsed("ANALYTICS_CACHE_TTL_SECS", 3600)?)
            .map_err(|_| ApiError::InvalidConfig("ANALYTICS_CACHE_TTL_SECS must be positive".into()))?;

        let fill_default = FillTriple::default();
        let forecast_fill = FillTriple {
            predicted: parsed("FORECAST_FILL_PREDICTED", fill_default.predicted)?,
            lower: parsed("FORECAST_FILL_LOWER", fill_default.lower)?,
            upper: parsed("FORECAST_FILL_UPPER", fill_default.upper)?,
        };

        Ok(Self {
            server_addr,
            database_path: lookup("DATABASE_PATH").map(PathBuf::from),
            cache_backend,
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            analytics_cache_ttl: Duration::from_secs(ttl_secs),
            model_dir: lookup("MODEL_DIR")
                .map_or_else(|| PathBuf::from("data/models"), PathBuf::from),
            forecast_fill,
            enable_playground: lookup("ENABLE_PLAYGROUND")
                .is_none_or(|v| v == "true" || v == "1"),
            max_query_depth: lookup("MAX_QUERY_DEPTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_query_complexity: lookup("MAX_QUERY_COMPLEXITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    /// Analytics engine settings
    pub fn analytics(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            cache_ttl: self.analytics_cache_ttl,
            ..AnalyticsConfig::default()
        }
    }

    /// Forecast engine settings
    pub fn forecast(&self) -> ForecastConfig {
        ForecastConfig {
            model_dir: Some(self.model_dir.clone()),
            short_series_fill: self.forecast_fill,
            ..ForecastConfig::default()
        }
    }
}
