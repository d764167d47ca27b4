//! Read strategy implementations using enum dispatch.
//!
//! A read pairs a cache lookup with a computation against the record store.
//! The strategy decides which side runs and whether the computed value is
//! written back.

use std::fmt::Debug;
use std::future::Future;

/// Read strategy enum - determines cache/store access pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Check cache first, compute on miss and store the result
    #[default]
    CacheFirst,
    /// Always compute, never touch the cache
    Bypass,
    /// Always compute, then store the result for later readers
    ReadThrough,
}

/// Where a value returned by [`ReadStrategy::read`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Cache,
    Store,
}

/// A value together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: ReadSource,
}

impl<T> Fetched<T> {
    pub const fn from_cache(value: T) -> Self {
        Self {
            value,
            source: ReadSource::Cache,
        }
    }

    pub const fn from_store(value: T) -> Self {
        Self {
            value,
            source: ReadSource::Store,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.source == ReadSource::Cache
    }
}

impl ReadStrategy {
    /// Execute a read according to the strategy.
    ///
    /// - `cache_fn`: looks the value up in the cache
    /// - `compute_fn`: produces the value from the record store
    /// - `populate_fn`: stores a freshly computed value
    ///
    /// Cache lookup and populate failures are logged and swallowed. Only a
    /// failing computation is returned to the caller.
    pub async fn read<T, E, CacheFut, ComputeFut, PopulateFut>(
        self,
        cache_fn: impl FnOnce() -> CacheFut,
        compute_fn: impl FnOnce() -> ComputeFut,
        populate_fn: impl FnOnce(T) -> PopulateFut,
    ) -> Result<Fetched<T>, E>
    where
        T: Clone + Debug,
        CacheFut: Future<Output = Result<Option<T>, CacheError>>,
        ComputeFut: Future<Output = Result<T, E>>,
        PopulateFut: Future<Output = Result<(), CacheError>>,
    {
        match self {
            Self::CacheFirst => {
                match cache_fn().await {
                    Ok(Some(value)) => {
                        tracing::debug!("Cache hit");
                        return Ok(Fetched::from_cache(value));
                    }
                    Ok(None) => {
                        tracing::debug!("Cache miss, computing from store");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cache lookup failed, computing from store");
                    }
                }

                let value = compute_fn().await?;
                if let Err(e) = populate_fn(value.clone()).await {
                    tracing::warn!(error = %e, "Failed to populate cache");
                }
                Ok(Fetched::from_store(value))
            }

            Self::Bypass => compute_fn().await.map(Fetched::from_store),

            Self::ReadThrough => {
                let value = compute_fn().await?;
                if let Err(e) = populate_fn(value.clone()).await {
                    tracing::warn!(error = %e, "Failed to populate cache");
                }
                Ok(Fetched::from_store(value))
            }
        }
    }
}

/// Cache operation error.
#[derive(Debug, thiserror::Error)]
#[error("Cache error: {0}")]
pub struct CacheError(#[from] pub Box<dyn std::error::Error + Send + Sync>);

impl CacheError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}
