//! Data models for the org SQL MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod query;
pub mod schema;
pub mod session;

// Re-export commonly used types
pub use query::{
    ColumnMetadata, DEFAULT_PAGE_SIZE, MAX_ROW_LIMIT, PageWindow, QueryParam, QueryResult,
};
pub use schema::{
    ColumnDefinition, ForeignKeyRef, Relationship, SchemaSnapshot, SchemaSource, TableSchema,
};
pub use session::{PageResult, SessionSummary};
