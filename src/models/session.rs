//! Pagination session data models.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// One page of a paginated query.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PageResult {
    /// Session identifier to pass to next_page, prev_page, goto_page and clear_session
    pub session_id: String,
    /// Current page number (1-based)
    pub page: u64,
    pub total_pages: u64,
    pub total_rows: u64,
    pub page_size: u32,
    /// Human readable row range, e.g. "3-4 of 5"
    pub showing: String,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub has_next: bool,
    pub has_prev: bool,
    /// Set when a navigation request was clamped (e.g. next on the last page)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub execution_time_ms: u64,
}

/// Summary of an active session, without its rows.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SessionSummary {
    pub session_id: String,
    pub query: String,
    pub page: u64,
    pub total_pages: u64,
    pub total_rows: u64,
    pub page_size: u32,
    /// RFC 3339 creation time
    pub created_at: String,
    /// Seconds since the session was last used
    pub idle_secs: u64,
}

/// Total pages for a result set; an empty result still has one (empty) page.
pub fn total_pages(total_rows: u64, page_size: u32) -> u64 {
    total_rows.div_ceil(page_size.max(1) as u64).max(1)
}

/// "a-b of n" for a 1-based page.
pub fn showing_range(page: u64, page_size: u32, total_rows: u64, rows_on_page: usize) -> String {
    if rows_on_page == 0 {
        return format!("0 of {}", total_rows);
    }
    let start = (page - 1) * page_size as u64 + 1;
    let end = start + rows_on_page as u64 - 1;
    format!("{}-{} of {}", start, end, total_rows)
}
