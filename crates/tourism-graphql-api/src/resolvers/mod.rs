//! # GraphQL Resolvers Module

pub mod mutation;
pub mod query;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
