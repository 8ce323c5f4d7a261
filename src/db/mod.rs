//! Database access layer.
//!
//! This module provides database access functionality:
//! - Backend selection and connection setup
//! - The built-in schema catalog and table whitelist
//! - Query execution
//! - Schema introspection
//! - Type mappings
//! - Pagination sessions

pub mod backend;
pub mod catalog;
pub mod executor;
pub mod schema;
pub mod session_store;
pub mod types;

pub use backend::{Backend, SqlEngine};
pub use executor::QueryExecutor;
pub use schema::SchemaInspector;
pub use session_store::SessionStore;
