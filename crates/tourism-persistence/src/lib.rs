//! # Tourism Persistence Library
//!
//! Storage layer for the tourism analytics service.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Analytics Engine / Forecast Engine                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Repository Traits                          │
//! │  (ArrivalRepository, OccupancyRepository, ...,               │
//! │   QueryCacheRepository)                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │  Redis (optional)       │   │        DuckDB                │
//! │  query cache lists      │   │  records + query cache       │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! The [`strategy::ReadStrategy`] decides how cached reads combine the
//! cache with a computation against the store.
//!
//! ## Features
//!
//! - `duckdb`: Enable the DuckDB store (default)
//! - `redis`: Enable the Redis query cache (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tourism_persistence::{ArrivalRepository, DuckDbStore};
//!
//! let store = DuckDbStore::open("data/tourism.duckdb")?;
//! store.insert_arrivals(&records).await?;
//! let total = store.total_arrivals(&filter).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "redis")]
pub mod cache;
pub mod error;
pub mod repository;
pub mod strategy;

#[cfg(feature = "redis")]
pub use cache::{CacheConfig, RedisQueryCache};
pub use error::{PersistenceError, Result};
#[cfg(feature = "duckdb")]
pub use repository::DuckDbStore;
pub use repository::{
    ArrivalGroup, ArrivalRepository, DailyOccupancy, DailyTotal, EconomicRepository,
    ForecastRepository, LocationOccupancy, MonthlyAverage, OccupancyGroup, OccupancyRepository,
    OccupancyStats, OriginLocationTotal, OriginTotal, QueryCacheRepository, RecordStore,
};
pub use strategy::{CacheError, Fetched, ReadSource, ReadStrategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
