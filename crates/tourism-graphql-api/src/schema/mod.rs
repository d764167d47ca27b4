//! # GraphQL Schema Module
//!
//! GraphQL type system for the tourism analytics API.

pub mod enums;
pub mod inputs;
pub mod objects;

pub use enums::*;
pub use inputs::*;
pub use objects::*;
