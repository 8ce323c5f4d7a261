//! Pagination tools.
//!
//! This module implements `paginated_query`, `next_page`, `prev_page`, `goto_page`,
//! `clear_session` and `list_sessions` on top of the [`SessionStore`](crate::db::SessionStore).

use crate::error::AgentResult;
use crate::models::{DEFAULT_PAGE_SIZE, MAX_ROW_LIMIT, PageResult, SessionSummary};
use crate::tools::AppState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input for the paginated_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PaginatedQueryInput {
    /// A single SELECT statement. Add ORDER BY for stable pages.
    pub query: String,
    /// Rows per page, 1-50. Default: 20. Out-of-range values are clamped.
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// Input for next_page, prev_page and clear_session.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionInput {
    /// Session id returned by paginated_query
    pub session_id: String,
}

/// Input for the goto_page tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GotoPageInput {
    /// Session id returned by paginated_query
    pub session_id: String,
    /// 1-based page number. Out-of-range values are clamped to the first or last page.
    pub page: i64,
}

/// Output from the clear_session tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClearSessionOutput {
    pub session_id: String,
    /// False if no such session existed (clearing is idempotent)
    pub cleared: bool,
    pub message: String,
}

/// Output from the list_sessions tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListSessionsOutput {
    pub sessions: Vec<SessionSummary>,
    pub count: usize,
    /// Idle time after which a session expires
    pub ttl_secs: u64,
}

/// Clamp a requested page size into `1..=MAX_ROW_LIMIT`.
pub fn clamp_page_size(requested: Option<i64>) -> u32 {
    requested
        .map(|size| size.clamp(1, MAX_ROW_LIMIT as i64) as u32)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

pub struct PaginationToolHandler {
    state: Arc<AppState>,
}

impl PaginationToolHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn paginated_query(&self, input: PaginatedQueryInput) -> AgentResult<PageResult> {
        let query = self.state.executor.gate().validate(&input.query)?;
        self.state
            .sessions
            .create(query, Some(clamp_page_size(input.page_size)))
            .await
    }

    pub async fn next_page(&self, input: SessionInput) -> AgentResult<PageResult> {
        self.state.sessions.next(input.session_id.trim()).await
    }

    pub async fn prev_page(&self, input: SessionInput) -> AgentResult<PageResult> {
        self.state.sessions.prev(input.session_id.trim()).await
    }

    pub async fn goto_page(&self, input: GotoPageInput) -> AgentResult<PageResult> {
        self.state
            .sessions
            .goto(input.session_id.trim(), input.page)
            .await
    }

    pub async fn clear_session(&self, input: SessionInput) -> ClearSessionOutput {
        let session_id = input.session_id.trim().to_string();
        let cleared = self.state.sessions.clear(&session_id).await;
        let message = if cleared {
            format!("Session {} cleared", session_id)
        } else {
            format!("No active session {}; nothing to clear", session_id)
        };
        ClearSessionOutput {
            session_id,
            cleared,
            message,
        }
    }

    pub async fn list_sessions(&self) -> ListSessionsOutput {
        let sessions = self.state.sessions.list().await;
        ListSessionsOutput {
            count: sessions.len(),
            sessions,
            ttl_secs: self.state.sessions.ttl().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::tools::test_support::static_state;

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(None), 20);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(-3)), 1);
        assert_eq!(clamp_page_size(Some(7)), 7);
        assert_eq!(clamp_page_size(Some(500)), 50);
    }

    #[tokio::test]
    async fn test_walk_pages() {
        let handler = PaginationToolHandler::new(static_state().await);
        let first = handler
            .paginated_query(PaginatedQueryInput {
                query: "SELECT id, name FROM employee ORDER BY id".to_string(),
                page_size: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.showing, "1-2 of 5");
        assert!(first.has_next && !first.has_prev);

        let id = first.session_id.clone();
        let last = handler
            .goto_page(GotoPageInput {
                session_id: id.clone(),
                page: 3,
            })
            .await
            .unwrap();
        assert_eq!(last.rows.len(), 1);
        assert_eq!(last.rows[0]["name"], "Evan Wright");

        let back = handler
            .prev_page(SessionInput {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(back.page, 2);
        assert_eq!(back.showing, "3-4 of 5");

        let listed = handler.list_sessions().await;
        assert_eq!(listed.count, 1);
        assert_eq!(listed.sessions[0].page, 2);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let handler = PaginationToolHandler::new(static_state().await);
        let page = handler
            .paginated_query(PaginatedQueryInput {
                query: "SELECT * FROM department".to_string(),
                page_size: None,
            })
            .await
            .unwrap();
        assert_eq!(page.page_size, 20);
        assert_eq!(page.total_pages, 1);

        let input = SessionInput {
            session_id: page.session_id.clone(),
        };
        assert!(handler.clear_session(input.clone()).await.cleared);
        assert!(!handler.clear_session(input.clone()).await.cleared);

        let err = handler.next_page(input).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_rejected_query_creates_no_session() {
        let handler = PaginationToolHandler::new(static_state().await);
        let err = handler
            .paginated_query(PaginatedQueryInput {
                query: "UPDATE employee SET name = 'x'".to_string(),
                page_size: Some(5),
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(handler.list_sessions().await.count, 0);
    }
}
