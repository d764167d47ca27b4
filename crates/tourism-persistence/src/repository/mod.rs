//! # Repository Module
//!
//! Record store traits and the DuckDB implementation.

pub mod traits;

#[cfg(feature = "duckdb")]
pub mod duckdb_impl;

pub use traits::*;

#[cfg(feature = "duckdb")]
pub use duckdb_impl::DuckDbStore;
