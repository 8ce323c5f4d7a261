//! Employee and department listings.
//!
//! Fixed statements with bound parameters; no client text is ever spliced into SQL.

use crate::db::SqlEngine;
use crate::error::AgentResult;
use crate::models::{MAX_ROW_LIMIT, QueryParam};
use crate::tools::AppState;
use crate::tools::sql_validator::check_id_parameter;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

const EMPLOYEES_SQL: &str = "SELECT e.id, e.name, e.email, d.name AS department, r.title AS role, e.hire_date \
     FROM employee e \
     LEFT JOIN department d ON e.department_id = d.id \
     LEFT JOIN role r ON e.role_id = r.id";

const DEPARTMENTS_SQL: &str = "SELECT id, name, location FROM department ORDER BY id";

/// Employee listing for the given engine, optionally filtered by department.
pub(crate) fn employees_sql(engine: SqlEngine, filtered: bool) -> String {
    let filter = if filtered {
        format!(" WHERE e.department_id = {}", engine.placeholder(1))
    } else {
        String::new()
    };
    format!("{}{} ORDER BY e.id", EMPLOYEES_SQL, filter)
}

/// Input for the list_employees tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListEmployeesInput {
    /// Only employees of this department (see list_departments). Must be a non-negative integer.
    #[serde(default)]
    pub department_id: Option<i64>,
}

/// Output from the list_employees tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListEmployeesOutput {
    /// id, name, email, department, role, hire_date
    pub employees: Vec<serde_json::Map<String, JsonValue>>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    pub truncated: bool,
}

/// Output from the list_departments tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListDepartmentsOutput {
    /// id, name, location
    pub departments: Vec<serde_json::Map<String, JsonValue>>,
    pub count: usize,
}

pub struct DirectoryToolHandler {
    state: Arc<AppState>,
}

impl DirectoryToolHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn list_employees(&self, input: ListEmployeesInput) -> AgentResult<ListEmployeesOutput> {
        let department_id = input
            .department_id
            .map(|id| check_id_parameter("department_id", id))
            .transpose()?;

        let engine = self.state.executor.engine();
        let (sql, params) = match department_id {
            Some(id) => (employees_sql(engine, true), vec![QueryParam::Int(id)]),
            None => (employees_sql(engine, false), Vec::new()),
        };

        let result = self
            .state
            .executor
            .fetch_internal(&sql, &params, MAX_ROW_LIMIT)
            .await?;

        info!(
            tool = "list_employees",
            department_id = ?department_id,
            rows = result.row_count(),
            "Listed employees"
        );
        Ok(ListEmployeesOutput {
            count: result.row_count(),
            truncated: result.truncated,
            employees: result.rows,
            department_id,
        })
    }

    pub async fn list_departments(&self) -> AgentResult<ListDepartmentsOutput> {
        let result = self
            .state
            .executor
            .fetch_internal(DEPARTMENTS_SQL, &[], MAX_ROW_LIMIT)
            .await?;
        Ok(ListDepartmentsOutput {
            count: result.row_count(),
            departments: result.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::tools::test_support::static_state;

    #[test]
    fn test_employees_sql_uses_placeholder() {
        let pg = employees_sql(SqlEngine::Postgres, true);
        assert!(pg.contains("WHERE e.department_id = $1 ORDER BY e.id"));
        let lite = employees_sql(SqlEngine::Sqlite, false);
        assert!(lite.ends_with("LEFT JOIN role r ON e.role_id = r.id ORDER BY e.id"));
    }

    #[test]
    fn test_department_id_must_be_integer() {
        let err = serde_json::from_str::<ListEmployeesInput>(r#"{"department_id": "1 OR 1=1"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<ListEmployeesInput>(r#"{"department_id": 1.5}"#);
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_list_all_employees() {
        let handler = DirectoryToolHandler::new(static_state().await);
        let output = handler
            .list_employees(ListEmployeesInput::default())
            .await
            .unwrap();
        assert_eq!(output.count, 5);
        assert_eq!(output.employees[0]["name"], "Alice Smith");
        assert_eq!(output.employees[0]["department"], "Engineering");
        assert_eq!(output.employees[0]["role"], "Senior Engineer");
    }

    #[tokio::test]
    async fn test_list_employees_by_department() {
        let handler = DirectoryToolHandler::new(static_state().await);
        let output = handler
            .list_employees(ListEmployeesInput {
                department_id: Some(1),
            })
            .await
            .unwrap();
        let names: Vec<&str> = output
            .employees
            .iter()
            .filter_map(|e| e["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Alice Smith", "Bob Jones"]);

        let none = handler
            .list_employees(ListEmployeesInput {
                department_id: Some(99),
            })
            .await
            .unwrap();
        assert_eq!(none.count, 0);
    }

    #[tokio::test]
    async fn test_negative_department_rejected() {
        let handler = DirectoryToolHandler::new(static_state().await);
        let err = handler
            .list_employees(ListEmployeesInput {
                department_id: Some(-1),
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_list_departments() {
        let handler = DirectoryToolHandler::new(static_state().await);
        let output = handler.list_departments().await.unwrap();
        assert_eq!(output.count, 4);
        let names: Vec<&str> = output
            .departments
            .iter()
            .filter_map(|d| d["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Engineering", "HR", "Sales", "Marketing"]);
        assert_eq!(output.departments[3]["location"], "Building B");
    }
}
