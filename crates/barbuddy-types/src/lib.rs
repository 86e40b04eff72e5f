//! Shared types for BarBuddy.
//!
//! Holds the declarative payload schema used to validate request bodies
//! before they reach the store.

pub mod schema;

pub use schema::{PayloadSchema, SchemaError};
