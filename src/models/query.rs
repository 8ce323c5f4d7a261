//! Query-related data models.
//!
//! This module defines types for query results, page windows and bound parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Hard cap on rows returned by any single call.
pub const MAX_ROW_LIMIT: u32 = 50;

/// Page size used by `paginated_query` when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A parameter value for the server's own parameterized queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// String value
    String(String),
}

impl QueryParam {
    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::String(_) => "string",
        }
    }
}

/// Slice of a result set, `LIMIT limit OFFSET offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

impl PageWindow {
    /// Window for a 1-based page number.
    pub fn for_page(page: u64, page_size: u32) -> Self {
        Self {
            offset: page.saturating_sub(1) * page_size as u64,
            limit: page_size,
        }
    }

    /// The first `limit` rows.
    pub fn first(limit: u32) -> Self {
        Self { offset: 0, limit }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Database-specific type (e.g., "int8", "varchar", "TEXT")
    pub type_name: String,
    pub nullable: bool,
}

impl ColumnMetadata {
    /// Create new column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// True if more rows existed than were returned
    pub truncated: bool,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn empty(execution_time_ms: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            truncated: false,
            execution_time_ms,
        }
    }

    /// Get the number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_types() {
        assert_eq!(QueryParam::Int(42).type_name(), "int");
        assert_eq!(QueryParam::Null.type_name(), "null");
        assert_eq!(QueryParam::String("hr".to_string()).type_name(), "string");
    }

    #[test]
    fn test_page_window() {
        assert_eq!(PageWindow::for_page(1, 20), PageWindow { offset: 0, limit: 20 });
        assert_eq!(PageWindow::for_page(3, 2), PageWindow { offset: 4, limit: 2 });
        // Page 0 is treated as page 1.
        assert_eq!(PageWindow::for_page(0, 5).offset, 0);
    }

    #[test]
    fn test_query_result_empty() {
        let result = QueryResult::empty(10);
        assert_eq!(result.row_count(), 0);
        assert!(!result.truncated);
    }
}
