//! Ad-hoc query tools.
//!
//! This module implements `execute_sql` (rows as JSON) and `run_query` (rows as a
//! text table). Both pass the query through the safety gate first and return at most
//! [`MAX_ROW_LIMIT`] rows; larger results are pointed at `paginated_query`.

use crate::error::AgentResult;
use crate::models::{ColumnMetadata, MAX_ROW_LIMIT, QueryResult};
use crate::tools::AppState;
use crate::tools::format::{TextFormat, format_as_markdown, format_as_table};
use crate::tools::sql_validator::ValidatedQuery;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for the execute_sql tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteSqlInput {
    /// A single SELECT statement over department, role, employee or project.
    pub query: String,
}

/// Input for the run_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunQueryInput {
    /// A single SELECT statement over department, role, employee or project.
    pub query: String,
    /// Output layout: "markdown" (default) or "table"
    #[serde(default)]
    pub format: TextFormat,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ColumnMetadataOutput {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
}

impl From<ColumnMetadata> for ColumnMetadataOutput {
    fn from(meta: ColumnMetadata) -> Self {
        Self {
            name: meta.name,
            type_name: meta.type_name,
            nullable: meta.nullable,
        }
    }
}

/// Output from the execute_sql tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExecuteSqlOutput {
    /// The statement as executed (normalized)
    pub sql: String,
    pub columns: Vec<ColumnMetadataOutput>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub row_count: usize,
    /// True if the query produced more rows than were returned
    pub truncated: bool,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ExecuteSqlOutput {
    pub fn from_result(query: &ValidatedQuery, result: QueryResult) -> Self {
        let hint = result.truncated.then(|| truncation_hint(None));
        Self {
            sql: query.sql().to_string(),
            row_count: result.row_count(),
            truncated: result.truncated,
            execution_time_ms: result.execution_time_ms,
            columns: result.columns.into_iter().map(Into::into).collect(),
            rows: result.rows,
            hint,
        }
    }
}

/// Output from the run_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RunQueryOutput {
    pub sql: String,
    /// Rendered result table
    pub formatted: String,
    pub row_count: usize,
    /// Rows the query produces in total; counted only when the result was cut off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    pub truncated: bool,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn truncation_hint(total_rows: Option<u64>) -> String {
    match total_rows {
        Some(total) => format!(
            "Showing the first {} of {} rows. Use paginated_query to browse all of them.",
            MAX_ROW_LIMIT, total
        ),
        None => format!(
            "More than {} rows matched. Use paginated_query to browse all of them.",
            MAX_ROW_LIMIT
        ),
    }
}

/// Handler for the ad-hoc query tools.
pub struct QueryToolHandler {
    state: Arc<AppState>,
}

impl QueryToolHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Validate and run a query, returning JSON rows.
    pub async fn execute_sql(&self, input: ExecuteSqlInput) -> AgentResult<ExecuteSqlOutput> {
        let query = self.state.executor.gate().validate(&input.query)?;
        let result = self.state.executor.execute(&query).await?;

        info!(
            tool = "execute_sql",
            rows = result.row_count(),
            truncated = result.truncated,
            elapsed_ms = result.execution_time_ms,
            "Query executed"
        );
        Ok(ExecuteSqlOutput::from_result(&query, result))
    }

    /// Validate and run a query, returning a rendered table.
    pub async fn run_query(&self, input: RunQueryInput) -> AgentResult<RunQueryOutput> {
        let query = self.state.executor.gate().validate(&input.query)?;
        let result = self.state.executor.execute(&query).await?;

        let total_rows = if result.truncated {
            match self.state.executor.count_rows(&query).await {
                Ok(total) => Some(total),
                Err(e) => {
                    warn!(error = %e, "Could not count rows of truncated result");
                    None
                }
            }
        } else {
            None
        };

        let columns = result.column_names();
        let formatted = match input.format {
            TextFormat::Markdown => format_as_markdown(&columns, &result.rows),
            TextFormat::Table => format_as_table(&columns, &result.rows, result.execution_time_ms),
        };

        info!(
            tool = "run_query",
            rows = result.row_count(),
            truncated = result.truncated,
            elapsed_ms = result.execution_time_ms,
            "Query executed"
        );

        Ok(RunQueryOutput {
            sql: query.sql().to_string(),
            formatted,
            row_count: result.row_count(),
            total_rows,
            truncated: result.truncated,
            execution_time_ms: result.execution_time_ms,
            hint: result.truncated.then(|| truncation_hint(total_rows)),
        })
    }
}
