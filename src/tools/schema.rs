//! Schema and status tools.
//!
//! This module implements the `get_schema`, `get_table_info`, `list_tables` and
//! `db_status` MCP tools. Table names from clients are resolved against the catalog
//! before anything is sent to the database.

use crate::db::catalog;
use crate::error::{AgentError, AgentResult};
use crate::models::{QueryResult, Relationship, SchemaSource, TableSchema};
use crate::tools::AppState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rows shown by get_table_info.
pub const SAMPLE_ROWS: u32 = 5;

/// Input for the get_table_info tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTableInfoInput {
    /// One of: department, role, employee, project
    pub table_name: String,
}

/// Output from the get_schema tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetSchemaOutput {
    /// "introspected" (read from the database) or "catalog" (built in)
    pub source: SchemaSource,
    pub tables: Vec<TableSchema>,
    pub relationships: Vec<Relationship>,
    /// The same schema rendered as markdown
    pub markdown: String,
}

/// Output from the get_table_info tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetTableInfoOutput {
    #[serde(flatten)]
    pub table: TableSchema,
    pub row_count: u64,
    pub sample_rows: Vec<serde_json::Map<String, JsonValue>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableSummary {
    pub name: String,
    pub description: String,
    pub column_count: usize,
    /// Omitted if the count query failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Output from the list_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    pub tables: Vec<TableSummary>,
    pub count: usize,
}

/// Output from the db_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DbStatusOutput {
    /// "postgres", "local" or "static"
    pub backend: String,
    pub static_mode: bool,
    pub database_configured: bool,
    /// Host and port (Postgres) or file path (local). Never includes credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_host: Option<String>,
    pub connected: bool,
    pub connection_test: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    /// Size of the local database file, e.g. "24 kB"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_size: Option<String>,
    pub schema_source: SchemaSource,
    pub llm_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    pub active_sessions: usize,
    pub session_ttl_secs: u64,
}

/// Format bytes as a human-readable size (1024-based units).
///
/// ```
/// use org_sql_mcp::tools::schema::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1024), "1 kB");
/// ```
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::WINDOWS)
}

pub struct SchemaToolHandler {
    state: Arc<AppState>,
}

impl SchemaToolHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn get_schema(&self) -> GetSchemaOutput {
        let schema = &self.state.schema;
        GetSchemaOutput {
            source: schema.source,
            tables: schema.tables.clone(),
            relationships: schema.relationships(),
            markdown: schema.to_markdown(),
        }
    }

    pub async fn get_table_info(&self, input: GetTableInfoInput) -> AgentResult<GetTableInfoOutput> {
        let Some(table) = catalog::canonical_table(&input.table_name) else {
            return Err(AgentError::table_not_found(
                input.table_name.trim(),
                &catalog::TABLE_NAMES,
            ));
        };

        let schema = self
            .state
            .schema
            .table(table)
            .cloned()
            .ok_or_else(|| AgentError::internal(format!("Table '{}' missing from schema", table)))?;

        let row_count = self.state.executor.count_table(table).await?;
        // `table` is the catalog's own spelling.
        let sample_sql = format!("SELECT * FROM {} LIMIT {}", table, SAMPLE_ROWS);
        let sample: QueryResult = self
            .state
            .executor
            .fetch_internal(&sample_sql, &[], SAMPLE_ROWS)
            .await?;

        debug!(table = table, row_count = row_count, "Described table");
        Ok(GetTableInfoOutput {
            table: schema,
            row_count,
            sample_rows: sample.rows,
        })
    }

    pub async fn list_tables(&self) -> ListTablesOutput {
        let mut tables = Vec::with_capacity(catalog::TABLE_NAMES.len());
        for name in catalog::TABLE_NAMES {
            let row_count = match self.state.executor.count_table(name).await {
                Ok(count) => Some(count),
                Err(e) => {
                    warn!(table = name, error = %e, "Row count failed");
                    None
                }
            };
            let (description, column_count) = match self.state.schema.table(name) {
                Some(t) => (t.description.clone(), t.columns.len()),
                None => (catalog::description(name).to_string(), 0),
            };
            tables.push(TableSummary {
                name: name.to_string(),
                description,
                column_count,
                row_count,
            });
        }
        ListTablesOutput {
            count: tables.len(),
            tables,
        }
    }

    pub async fn db_status(&self) -> DbStatusOutput {
        let backend = &self.state.backend;
        let (connected, connection_test) = match self.state.executor.ping().await {
            Ok(()) if backend.static_mode() => (
                true,
                "Connected (in-memory fixture, no database configured)".to_string(),
            ),
            Ok(()) => (true, "Connected successfully".to_string()),
            Err(e) => (false, format!("Connection failed: {}", e)),
        };

        let server_version = if connected {
            self.state.executor.backend().server_version().await
        } else {
            None
        };

        let database_size = match &backend.local_path {
            Some(path) => tokio::fs::metadata(path)
                .await
                .ok()
                .map(|m| format_size(m.len())),
            None => None,
        };

        DbStatusOutput {
            backend: backend.kind.to_string(),
            static_mode: backend.static_mode(),
            database_configured: backend.database_configured(),
            database_host: backend.host.clone(),
            connected,
            connection_test,
            server_version,
            database_size,
            schema_source: self.state.schema.source,
            llm_configured: self.state.generator.is_some(),
            llm_model: self.state.generator.as_ref().map(|g| g.model().to_string()),
            active_sessions: self.state.sessions.count().await,
            session_ttl_secs: self.state.sessions.ttl().as_secs(),
        }
    }
}
