//! MCP tool implementations.
//!
//! This module contains all tool handlers:
//! - `query`: `execute_sql` (JSON rows) and `run_query` (text table)
//! - `pagination`: session-based paging over a validated query
//! - `schema`: schema description, table details, backend status
//! - `directory`: fixed employee and department listings
//! - `generate`: natural-language questions answered through the LLM
//! - `advisor`: lint and optimization tips without execution
//! - `report`: ready-made markdown reports
//! - `sql_validator`: the safety gate every query passes through
//! - `format`: text rendering of result sets

pub mod advisor;
pub mod directory;
pub mod format;
pub mod generate;
pub mod pagination;
pub mod query;
pub mod report;
pub mod schema;
pub mod sql_validator;

use crate::config::{BackendConfig, BackendKind};
use crate::db::{QueryExecutor, SessionStore};
use crate::llm::SqlGenerator;
use crate::models::SchemaSnapshot;
use std::path::PathBuf;
use std::sync::Arc;

pub use directory::DirectoryToolHandler;
pub use generate::GenerateToolHandler;
pub use pagination::PaginationToolHandler;
pub use query::QueryToolHandler;
pub use report::ReportToolHandler;
pub use schema::SchemaToolHandler;

/// What the server knows about its backend, without credentials.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub kind: BackendKind,
    /// Host (and port) for Postgres, file path for the local backend
    pub host: Option<String>,
    pub local_path: Option<PathBuf>,
}

impl BackendInfo {
    pub fn from_config(config: &BackendConfig) -> Self {
        let local_path = match config {
            BackendConfig::Local { path } => Some(path.clone()),
            _ => None,
        };
        Self {
            kind: config.kind(),
            host: config.display_host(),
            local_path,
        }
    }

    pub fn static_mode(&self) -> bool {
        self.kind == BackendKind::Static
    }

    /// True when a real database (remote or file) backs the server.
    pub fn database_configured(&self) -> bool {
        !self.static_mode()
    }
}

/// Shared state behind every tool and resource.
pub struct AppState {
    pub executor: Arc<QueryExecutor>,
    pub sessions: Arc<SessionStore>,
    pub schema: Arc<SchemaSnapshot>,
    pub generator: Option<Arc<dyn SqlGenerator>>,
    pub backend: BackendInfo,
}

impl AppState {
    pub fn new(
        executor: Arc<QueryExecutor>,
        sessions: Arc<SessionStore>,
        schema: SchemaSnapshot,
        generator: Option<Arc<dyn SqlGenerator>>,
        backend: BackendInfo,
    ) -> Self {
        Self {
            executor,
            sessions,
            schema: Arc::new(schema),
            generator,
            backend,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::{Backend, catalog};
    use std::time::Duration;

    /// State over the in-memory fixture, no LLM.
    pub async fn static_state() -> Arc<AppState> {
        static_state_with(None).await
    }

    pub async fn static_state_with(generator: Option<Arc<dyn SqlGenerator>>) -> Arc<AppState> {
        let backend = Backend::connect(&BackendConfig::Static, Duration::from_secs(5))
            .await
            .unwrap();
        let executor = Arc::new(QueryExecutor::new(backend, Duration::from_secs(5)));
        let sessions = Arc::new(SessionStore::new(
            executor.clone(),
            Duration::from_secs(300),
            Duration::from_secs(60),
        ));
        Arc::new(AppState::new(
            executor,
            sessions,
            catalog::snapshot(),
            generator,
            BackendInfo::from_config(&BackendConfig::Static),
        ))
    }
}
