//! Pagination session store.
//!
//! A session remembers one validated query, its row count and the current page, so
//! clients can walk a result set across tool calls. Sessions live in memory only and
//! expire after a period without access (sliding TTL). An expired session leaves a
//! tombstone for one more TTL so clients get "expired" rather than "not found".
//!
//! Locking: each session has its own mutex, so page fetches on different sessions run
//! concurrently. A request may take the map write lock while holding its session lock;
//! the sweeper holds the map write lock and only ever `try_lock`s sessions, skipping
//! busy ones, so the two orders cannot deadlock.

use crate::db::executor::QueryExecutor;
use crate::error::{AgentError, AgentResult};
use crate::models::session::{showing_range, total_pages};
use crate::models::{
    DEFAULT_PAGE_SIZE, MAX_ROW_LIMIT, PageResult, PageWindow, QueryResult, SessionSummary,
};
use crate::tools::sql_validator::ValidatedQuery;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Every page is a separate fetch, so an unordered result may shift between them.
const UNORDERED_NOTICE: &str =
    "Query has no ORDER BY; rows may repeat or be skipped across pages. Add ORDER BY for stable paging";

struct Session {
    id: String,
    query: ValidatedQuery,
    page_size: u32,
    current_page: u64,
    total_rows: u64,
    created_at: DateTime<Utc>,
    last_access: Instant,
}

impl Session {
    fn total_pages(&self) -> u64 {
        total_pages(self.total_rows, self.page_size)
    }

    fn idle(&self) -> Duration {
        self.last_access.elapsed()
    }

    fn page_result(&self, result: QueryResult, notice: Option<String>) -> PageResult {
        let total_pages = self.total_pages();
        let notice = notice.or_else(|| {
            (!self.query.is_ordered() && total_pages > 1).then(|| UNORDERED_NOTICE.to_string())
        });
        PageResult {
            session_id: self.id.clone(),
            page: self.current_page,
            total_pages,
            total_rows: self.total_rows,
            page_size: self.page_size,
            showing: showing_range(
                self.current_page,
                self.page_size,
                self.total_rows,
                result.row_count(),
            ),
            columns: result.column_names(),
            rows: result.rows,
            has_next: self.current_page < total_pages,
            has_prev: self.current_page > 1,
            notice,
            execution_time_ms: result.execution_time_ms,
        }
    }
}

enum Slot {
    Live(Arc<Mutex<Session>>),
    Expired { at: Instant, idle_secs: u64 },
}

/// Page navigation requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Prev,
    Goto(i64),
}

/// Resolve a navigation request against the current position.
///
/// Returns the target page and a notice when the request had to be clamped.
pub fn resolve_navigation(
    current: u64,
    total_pages: u64,
    nav: Navigation,
) -> (u64, Option<String>) {
    match nav {
        Navigation::Next if current >= total_pages => (
            total_pages,
            Some("Already on the last page".to_string()),
        ),
        Navigation::Next => (current + 1, None),
        Navigation::Prev if current <= 1 => (1, Some("Already on the first page".to_string())),
        Navigation::Prev => (current - 1, None),
        Navigation::Goto(page) if page < 1 => (
            1,
            Some(format!("Page {} is out of range; showing page 1", page)),
        ),
        Navigation::Goto(page) if page as u64 > total_pages => (
            total_pages,
            Some(format!(
                "Page {} is out of range; showing last page {}",
                page, total_pages
            )),
        ),
        Navigation::Goto(page) => (page as u64, None),
    }
}

pub struct SessionStore {
    executor: Arc<QueryExecutor>,
    slots: RwLock<HashMap<String, Slot>>,
    ttl: Duration,
    sweep_interval: Duration,
}

impl SessionStore {
    pub fn new(executor: Arc<QueryExecutor>, ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            executor,
            slots: RwLock::new(HashMap::new()),
            ttl,
            sweep_interval,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for a validated query and return its first page.
    pub async fn create(
        &self,
        query: ValidatedQuery,
        page_size: Option<u32>,
    ) -> AgentResult<PageResult> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_ROW_LIMIT);
        let total_rows = self.executor.count_rows(&query).await?;
        let result = self
            .executor
            .fetch_page(&query, PageWindow::for_page(1, page_size))
            .await?;

        let session = Session {
            id: generate_session_id(),
            query,
            page_size,
            current_page: 1,
            total_rows,
            created_at: Utc::now(),
            last_access: Instant::now(),
        };
        let page = session.page_result(result, None);

        info!(
            session_id = %session.id,
            total_rows = total_rows,
            page_size = page_size,
            "Pagination session created"
        );

        let mut slots = self.slots.write().await;
        slots.insert(session.id.clone(), Slot::Live(Arc::new(Mutex::new(session))));
        Ok(page)
    }

    pub async fn next(&self, session_id: &str) -> AgentResult<PageResult> {
        self.navigate(session_id, Navigation::Next).await
    }

    pub async fn prev(&self, session_id: &str) -> AgentResult<PageResult> {
        self.navigate(session_id, Navigation::Prev).await
    }

    pub async fn goto(&self, session_id: &str, page: i64) -> AgentResult<PageResult> {
        self.navigate(session_id, Navigation::Goto(page)).await
    }

    async fn navigate(&self, session_id: &str, nav: Navigation) -> AgentResult<PageResult> {
        let handle = self.checkout(session_id).await?;
        let mut session = handle.lock().await;

        if session.idle() >= self.ttl {
            let idle_secs = session.idle().as_secs();
            drop(session);
            self.bury(session_id, idle_secs).await;
            return Err(AgentError::session_expired(session_id, idle_secs));
        }

        let (target, notice) = resolve_navigation(session.current_page, session.total_pages(), nav);
        let result = self
            .executor
            .fetch_page(
                &session.query,
                PageWindow::for_page(target, session.page_size),
            )
            .await?;

        session.current_page = target;
        session.last_access = Instant::now();
        debug!(session_id = %session_id, page = target, "Served page");
        Ok(session.page_result(result, notice))
    }

    /// Remove a session. Returns whether a session (live or expired) was removed.
    pub async fn clear(&self, session_id: &str) -> bool {
        let removed = self.slots.write().await.remove(session_id).is_some();
        if removed {
            info!(session_id = %session_id, "Pagination session cleared");
        }
        removed
    }

    /// Summaries of live sessions. Busy sessions are reported from their last state.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let handles: Vec<Arc<Mutex<Session>>> = {
            let slots = self.slots.read().await;
            slots
                .values()
                .filter_map(|slot| match slot {
                    Slot::Live(s) => Some(Arc::clone(s)),
                    Slot::Expired { .. } => None,
                })
                .collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let session = handle.lock().await;
            if session.idle() >= self.ttl {
                continue;
            }
            summaries.push(SessionSummary {
                session_id: session.id.clone(),
                query: session.query.sql().to_string(),
                page: session.current_page,
                total_pages: session.total_pages(),
                total_rows: session.total_rows,
                page_size: session.page_size,
                created_at: session.created_at.to_rfc3339(),
                idle_secs: session.idle().as_secs(),
            });
        }
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        summaries
    }

    /// Number of live (not yet swept) sessions.
    pub async fn count(&self) -> usize {
        let slots = self.slots.read().await;
        slots
            .values()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    /// Expire idle sessions and drop old tombstones. Returns the number expired.
    pub async fn sweep(&self) -> usize {
        let mut slots = self.slots.write().await;
        let now = Instant::now();
        let mut expired = 0;

        for slot in slots.values_mut() {
            let idle_secs = match slot {
                Slot::Live(handle) => match handle.try_lock() {
                    Ok(session) if session.idle() >= self.ttl => session.idle().as_secs(),
                    _ => continue,
                },
                Slot::Expired { .. } => continue,
            };
            *slot = Slot::Expired { at: now, idle_secs };
            expired += 1;
        }

        let ttl = self.ttl;
        slots.retain(|_, slot| match slot {
            Slot::Expired { at, .. } => now.duration_since(*at) < ttl,
            Slot::Live(_) => true,
        });

        if expired > 0 {
            info!(expired = expired, remaining = slots.len(), "Expired idle sessions");
        }
        expired
    }

    /// Start the periodic sweeper. Abort the returned handle on shutdown.
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.sweep_interval);
            interval.tick().await;
            loop {
                interval.tick().await;
                self.sweep().await;
            }
        })
    }

    async fn checkout(&self, session_id: &str) -> AgentResult<Arc<Mutex<Session>>> {
        let slots = self.slots.read().await;
        match slots.get(session_id) {
            Some(Slot::Live(handle)) => Ok(Arc::clone(handle)),
            Some(Slot::Expired { idle_secs, .. }) => {
                Err(AgentError::session_expired(session_id, *idle_secs))
            }
            None => Err(AgentError::session_not_found(session_id)),
        }
    }

    async fn bury(&self, session_id: &str, idle_secs: u64) {
        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.get_mut(session_id) {
            *slot = Slot::Expired {
                at: Instant::now(),
                idle_secs,
            };
            info!(session_id = %session_id, idle_secs = idle_secs, "Pagination session expired");
        }
    }
}

/// Generate a new session id: `pg_` followed by 32 hex digits.
pub fn generate_session_id() -> String {
    format!("pg_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = generate_session_id();
        assert!(id.starts_with("pg_"));
        assert_eq!(id.len(), 35);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_resolve_navigation() {
        assert_eq!(resolve_navigation(1, 3, Navigation::Next), (2, None));
        let (page, notice) = resolve_navigation(3, 3, Navigation::Next);
        assert_eq!(page, 3);
        assert!(notice.unwrap().contains("last page"));

        assert_eq!(resolve_navigation(2, 3, Navigation::Prev), (1, None));
        let (page, notice) = resolve_navigation(1, 3, Navigation::Prev);
        assert_eq!(page, 1);
        assert!(notice.is_some());

        assert_eq!(resolve_navigation(1, 3, Navigation::Goto(2)), (2, None));
        assert_eq!(resolve_navigation(1, 3, Navigation::Goto(99)).0, 3);
        assert_eq!(resolve_navigation(2, 3, Navigation::Goto(0)).0, 1);
        assert_eq!(resolve_navigation(2, 3, Navigation::Goto(-4)).0, 1);
    }

    #[test]
    fn test_single_empty_page() {
        // An empty result has one page; every move stays on it.
        assert_eq!(resolve_navigation(1, 1, Navigation::Next).0, 1);
        assert_eq!(resolve_navigation(1, 1, Navigation::Prev).0, 1);
    }
}
