//! Query execution engine.
//!
//! This module runs validated queries against the connected backend with:
//! - Row caps (enforced via streaming - only fetches needed rows)
//! - Page windows (`LIMIT`/`OFFSET` wrapped around the validated query)
//! - Row counts for pagination
//! - Query timeouts
//!
//! Each engine submodule provides the same interface adapted to its type system.

use crate::db::backend::{Backend, SqlEngine};
use crate::db::types::RowToJson;
use crate::error::{AgentError, AgentResult};
use crate::models::{MAX_ROW_LIMIT, PageWindow, QueryParam, QueryResult};
use crate::tools::sql_validator::{SafetyGate, ValidatedQuery};
use futures_util::StreamExt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs queries against a single backend.
#[derive(Debug)]
pub struct QueryExecutor {
    backend: Backend,
    query_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(backend: Backend, query_timeout: Duration) -> Self {
        Self {
            backend,
            query_timeout,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn engine(&self) -> SqlEngine {
        self.backend.engine()
    }

    /// Safety gate configured for this backend's dialect.
    pub fn gate(&self) -> SafetyGate {
        SafetyGate::new(self.engine())
    }

    /// Run a validated query and return at most [`MAX_ROW_LIMIT`] rows.
    pub async fn execute(&self, query: &ValidatedQuery) -> AgentResult<QueryResult> {
        let (sql, row_limit) = match query.declared_limit() {
            Some(limit) => (
                query.sql().to_string(),
                limit.min(MAX_ROW_LIMIT as u64) as u32,
            ),
            // One row past the cap lets the engine stop early and still flag truncation.
            None => (
                format!("{} LIMIT {}", query.sql(), MAX_ROW_LIMIT + 1),
                MAX_ROW_LIMIT,
            ),
        };

        debug!(sql = %sql, limit = row_limit, "Executing query");
        self.fetch(&sql, &[], row_limit).await
    }

    /// Fetch one window of a validated query.
    pub async fn fetch_page(
        &self,
        query: &ValidatedQuery,
        window: PageWindow,
    ) -> AgentResult<QueryResult> {
        let engine = self.engine();
        // Paging clauses on an ordered query bind to its own ORDER BY; a derived
        // table's ordering is not guaranteed to survive the outer LIMIT.
        let sql = if query.is_ordered() && query.accepts_appended_limit() {
            format!(
                "{} LIMIT {} OFFSET {}",
                query.sql(),
                engine.placeholder(1),
                engine.placeholder(2)
            )
        } else {
            format!(
                "SELECT * FROM ({}) AS page_src LIMIT {} OFFSET {}",
                query.sql(),
                engine.placeholder(1),
                engine.placeholder(2)
            )
        };
        let params = [
            QueryParam::Int(window.limit as i64),
            QueryParam::Int(window.offset as i64),
        ];

        debug!(
            sql = %query.sql(),
            offset = window.offset,
            limit = window.limit,
            "Fetching page"
        );
        let mut result = self.fetch(&sql, &params, window.limit).await?;
        // The window is exact; a row past it belongs to the next page.
        result.truncated = false;
        Ok(result)
    }

    /// Count the rows a validated query produces.
    pub async fn count_rows(&self, query: &ValidatedQuery) -> AgentResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM ({}) AS count_src", query.sql());
        debug!(sql = %query.sql(), "Counting rows");
        self.scalar_count(&sql).await
    }

    /// Count all rows of a catalog table.
    pub async fn count_table(&self, table: &'static str) -> AgentResult<u64> {
        // Catalog names only; client input never reaches this format string.
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        self.scalar_count(&sql).await
    }

    async fn scalar_count(&self, sql: &str) -> AgentResult<u64> {
        let count = match &self.backend {
            Backend::Postgres(pool) => {
                self.with_timeout(
                    "row count",
                    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool),
                )
                .await?
            }
            Backend::Local(pool) | Backend::Static(pool) => {
                self.with_timeout(
                    "row count",
                    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool),
                )
                .await?
            }
        };
        Ok(count.max(0) as u64)
    }

    /// Run one of the server's own parameterized statements.
    ///
    /// `sql` must be a fixed string written for [`Self::engine`]; user text only
    /// ever arrives through `params`.
    pub async fn fetch_internal(
        &self,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
    ) -> AgentResult<QueryResult> {
        debug!(sql = %sql, params = params.len(), "Executing internal query");
        self.fetch(sql, params, row_limit.clamp(1, MAX_ROW_LIMIT))
            .await
    }

    /// Check that the backend answers.
    pub async fn ping(&self) -> AgentResult<()> {
        match &self.backend {
            Backend::Postgres(pool) => {
                self.with_timeout("ping", sqlx::query("SELECT 1").execute(pool))
                    .await?;
            }
            Backend::Local(pool) | Backend::Static(pool) => {
                self.with_timeout("ping", sqlx::query("SELECT 1").execute(pool))
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.backend.close().await;
    }

    async fn fetch(
        &self,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
    ) -> AgentResult<QueryResult> {
        let start = Instant::now();
        match &self.backend {
            Backend::Postgres(pool) => {
                let rows =
                    postgres::fetch_rows(pool, sql, params, row_limit, self.query_timeout).await?;
                Ok(process_rows(rows, row_limit, start))
            }
            Backend::Local(pool) | Backend::Static(pool) => {
                let rows =
                    sqlite::fetch_rows(pool, sql, params, row_limit, self.query_timeout).await?;
                Ok(process_rows(rows, row_limit, start))
            }
        }
    }

    async fn with_timeout<T, F>(&self, operation: &str, fut: F) -> AgentResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(AgentError::from),
            Err(_) => Err(timeout_error(operation, self.query_timeout)),
        }
    }
}

/// Process rows from any backend into a QueryResult.
fn process_rows<R: RowToJson>(rows: Vec<R>, row_limit: u32, start: Instant) -> QueryResult {
    let execution_time_ms = start.elapsed().as_millis() as u64;

    if rows.is_empty() {
        return QueryResult::empty(execution_time_ms);
    }

    let columns = rows[0].get_column_metadata();
    let total_rows = rows.len();
    let truncated = total_rows > row_limit as usize;

    let json_rows = rows
        .iter()
        .take(row_limit as usize)
        .map(|r| r.to_json_map())
        .collect();

    if truncated {
        warn!(limit = row_limit, "Query result truncated");
    }

    QueryResult {
        columns,
        rows: json_rows,
        truncated,
        execution_time_ms,
    }
}

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> AgentResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(AgentError::from)?);
    }
    Ok(rows)
}

fn timeout_error(operation: &str, timeout: Duration) -> AgentError {
    AgentError::timeout(operation, timeout.as_secs())
}

mod postgres {
    use super::*;
    use sqlx::PgPool;
    use sqlx::postgres::{PgArguments, PgRow};

    pub async fn fetch_rows(
        pool: &PgPool,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
        query_timeout: Duration,
    ) -> AgentResult<Vec<PgRow>> {
        let fetch_limit = row_limit as usize + 1;
        let rows_future = if params.is_empty() {
            use sqlx::Executor;
            let stream = pool.fetch(sql);
            stream.take(fetch_limit).collect::<Vec<_>>()
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            let stream = query.fetch(pool);
            stream.take(fetch_limit).collect::<Vec<_>>()
        };

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::String(v) => query.bind(v.as_str()),
        }
    }
}

mod sqlite {
    use super::*;
    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteArguments, SqliteRow};

    pub async fn fetch_rows(
        pool: &SqlitePool,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
        query_timeout: Duration,
    ) -> AgentResult<Vec<SqliteRow>> {
        let fetch_limit = row_limit as usize + 1;
        let rows_future = if params.is_empty() {
            use sqlx::Executor;
            let stream = pool.fetch(sql);
            stream.take(fetch_limit).collect::<Vec<_>>()
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            let stream = query.fetch(pool);
            stream.take(fetch_limit).collect::<Vec<_>>()
        };

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::String(v) => query.bind(v.as_str()),
        }
    }
}
