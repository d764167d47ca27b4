//! # Strategy Module
//!
//! Enum-based cache/store access strategies.
//!
//! - `CacheFirst` - Check cache, compute on miss and populate (default)
//! - `Bypass` - Skip the cache entirely
//! - `ReadThrough` - Always compute, populate the cache afterwards
//!
//! ```rust,ignore
//! use tourism_persistence::strategy::ReadStrategy;
//!
//! let fetched = ReadStrategy::CacheFirst
//!     .read(|| cache.lookup(fp), || engine.compute(req), |v| cache.store(fp, v))
//!     .await?;
//! ```

pub mod read_strategy;

pub use read_strategy::{CacheError, Fetched, ReadSource, ReadStrategy};
