//! End-to-end tests against a local SQLite file created in a temporary directory.

use org_sql_mcp::config::{BackendConfig, BackendKind};
use org_sql_mcp::db::{Backend, QueryExecutor, SchemaInspector, SessionStore};
use org_sql_mcp::error::ErrorCategory;
use org_sql_mcp::models::SchemaSource;
use org_sql_mcp::tools::directory::ListEmployeesInput;
use org_sql_mcp::tools::query::ExecuteSqlInput;
use org_sql_mcp::tools::schema::GetTableInfoInput;
use org_sql_mcp::tools::{
    AppState, BackendInfo, DirectoryToolHandler, QueryToolHandler, SchemaToolHandler,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn local_state(dir: &TempDir) -> Arc<AppState> {
    let config = BackendConfig::Local {
        path: dir.path().join("org.db"),
    };
    let backend = Backend::connect(&config, Duration::from_secs(5))
        .await
        .unwrap();
    let executor = Arc::new(QueryExecutor::new(backend, Duration::from_secs(5)));
    let schema = SchemaInspector::load(executor.backend()).await;
    let sessions = Arc::new(SessionStore::new(
        executor.clone(),
        Duration::from_secs(300),
        Duration::from_secs(60),
    ));
    Arc::new(AppState::new(
        executor,
        sessions,
        schema,
        None,
        BackendInfo::from_config(&config),
    ))
}

#[tokio::test]
async fn test_schema_is_introspected_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = local_state(&dir).await;
    assert_eq!(state.schema.source, SchemaSource::Introspected);

    let info = SchemaToolHandler::new(state.clone())
        .get_table_info(GetTableInfoInput {
            table_name: "Employee".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(info.row_count, 5);
    assert_eq!(info.sample_rows.len(), 5);
    assert!(info.table.column("department_id").is_some());

    let err = SchemaToolHandler::new(state)
        .get_table_info(GetTableInfoInput {
            table_name: "sqlite_master".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_queries_run_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let state = local_state(&dir).await;
    let handler = QueryToolHandler::new(state.clone());

    let output = handler
        .execute_sql(ExecuteSqlInput {
            query: "SELECT name, location FROM department ORDER BY id".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(output.row_count, 4);
    assert_eq!(output.rows[0]["name"], "Engineering");
    assert_eq!(output.rows[0]["location"], "Building A");

    let err = handler
        .execute_sql(ExecuteSqlInput {
            query: "DELETE FROM department".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    let employees = DirectoryToolHandler::new(state.clone())
        .list_employees(ListEmployeesInput::default())
        .await
        .unwrap();
    assert_eq!(employees.count, 5);
    state.executor.close().await;
}

#[tokio::test]
async fn test_db_status_reports_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = local_state(&dir).await;
    let status = SchemaToolHandler::new(state).db_status().await;
    assert_eq!(status.backend, BackendKind::Local.to_string());
    assert!(!status.static_mode);
    assert!(status.database_configured);
    assert!(status.connected);
    assert!(status.database_size.is_some());
    assert!(!status.llm_configured);
}
