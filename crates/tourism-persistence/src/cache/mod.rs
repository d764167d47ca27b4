//! # Cache Module
//!
//! Redis-backed storage for memoized analytics results.

pub mod redis_client;

pub use redis_client::{CacheConfig, RedisQueryCache};
