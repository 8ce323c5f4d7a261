//! Ready-made markdown reports.
//!
//! Each report combines fixed statements with the schema snapshot; like the
//! directory listings, no client text reaches the SQL.

use crate::error::AgentResult;
use crate::models::{MAX_ROW_LIMIT, QueryResult};
use crate::tools::AppState;
use crate::tools::directory::employees_sql;
use crate::tools::format::format_as_markdown;
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

const DEPARTMENT_SUMMARY_SQL: &str = "SELECT d.id, d.name, d.location, \
     (SELECT COUNT(*) FROM employee e WHERE e.department_id = d.id) AS employees, \
     (SELECT COUNT(*) FROM project p WHERE p.department_id = d.id) AS projects \
     FROM department d ORDER BY d.id";

const ROLE_SUMMARY_SQL: &str = "SELECT r.title AS role, COUNT(e.id) AS employees \
     FROM role r LEFT JOIN employee e ON e.role_id = r.id \
     GROUP BY r.id, r.title ORDER BY r.id";

/// Example statements shown in the schema report. Each one passes the safety gate.
pub const QUERY_PATTERNS: [(&str, &str); 3] = [
    (
        "Join employees with departments",
        "SELECT e.name, d.name AS department\nFROM employee e\nJOIN department d ON e.department_id = d.id\nORDER BY e.name;",
    ),
    (
        "Count by department",
        "SELECT d.name, COUNT(e.id) AS employees\nFROM department d\nLEFT JOIN employee e ON d.id = e.department_id\nGROUP BY d.name\nORDER BY employees DESC;",
    ),
    (
        "Filter by status",
        "SELECT name, status FROM project WHERE status = 'Active' ORDER BY name;",
    ),
];

/// Output of the report tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReportOutput {
    pub title: String,
    /// The full report as markdown
    pub markdown: String,
}

impl ReportOutput {
    fn new(title: &str, body: String) -> Self {
        Self {
            title: title.to_string(),
            markdown: format!("# {}\n\n{}", title, body),
        }
    }
}

pub struct ReportToolHandler {
    state: Arc<AppState>,
}

impl ReportToolHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    async fn fetch(&self, sql: &str) -> AgentResult<QueryResult> {
        self.state
            .executor
            .fetch_internal(sql, &[], MAX_ROW_LIMIT)
            .await
    }

    /// Employees with department and role, plus head counts.
    pub async fn employee_report(&self) -> AgentResult<ReportOutput> {
        let engine = self.state.executor.engine();
        let employees = self.fetch(&employees_sql(engine, false)).await?;
        let departments = self.fetch(DEPARTMENT_SUMMARY_SQL).await?;
        let roles = self.fetch(ROLE_SUMMARY_SQL).await?;

        let mut body = String::new();
        let _ = writeln!(body, "## Overview\n");
        let _ = writeln!(
            body,
            "- **Employees**: {}{}",
            employees.row_count(),
            if employees.truncated {
                format!(" (first {} listed)", MAX_ROW_LIMIT)
            } else {
                String::new()
            }
        );
        let _ = writeln!(body, "- **Departments**: {}", departments.row_count());
        let _ = writeln!(body, "- **Roles**: {}\n", roles.row_count());

        let _ = writeln!(body, "## All Employees\n");
        let _ = writeln!(body, "{}", markdown_table(&employees));
        let _ = writeln!(body, "## All Departments\n");
        let _ = writeln!(body, "{}", markdown_table(&departments));
        let _ = writeln!(body, "## Role Distribution\n");
        let _ = writeln!(body, "{}", markdown_table(&roles));

        let _ = writeln!(body, "## Database Schema\n");
        let _ = writeln!(body, "{}", demote_headings(&self.state.schema.to_markdown()));

        body.push_str(
            "## Next Steps\n\n\
             - Use `ask_database` for specific questions like \"How many employees per department?\"\n\
             - Use `generate_sql_query` to draft custom reports\n",
        );

        info!(
            tool = "employee_report",
            employees = employees.row_count(),
            "Report generated"
        );
        Ok(ReportOutput::new("Employee Summary Report", body))
    }

    /// Departments with their employee and project counts.
    pub async fn department_report(&self) -> AgentResult<ReportOutput> {
        let departments = self.fetch(DEPARTMENT_SUMMARY_SQL).await?;

        let mut body = String::new();
        let _ = writeln!(body, "## All Departments\n");
        let _ = writeln!(body, "{}", markdown_table(&departments));
        body.push_str(
            "## Available Queries\n\n\
             Ask `ask_database` questions like:\n\
             - \"How many employees are in Engineering?\"\n\
             - \"Which department has the most projects?\"\n\
             - \"List employees in the Sales department\"\n",
        );

        info!(
            tool = "department_report",
            departments = departments.row_count(),
            "Report generated"
        );
        Ok(ReportOutput::new("Department Analysis Report", body))
    }

    /// Schema documentation with relationships and query patterns. Reads no rows.
    pub fn schema_report(&self) -> ReportOutput {
        let schema = &self.state.schema;

        let mut body = format!("## Tables\n{}", demote_headings(&schema.to_markdown()));
        body.push_str("\n## Table Relationships\n\n");
        let relationships = schema.relationships();
        if relationships.is_empty() {
            body.push_str("No foreign keys were found.\n");
        }
        for rel in relationships {
            let _ = writeln!(
                body,
                "- {}.{} → {}.{}",
                rel.from_table, rel.from_column, rel.to_table, rel.to_column
            );
        }

        body.push_str("\n## Common Query Patterns\n");
        for (title, sql) in QUERY_PATTERNS {
            let _ = write!(body, "\n### {}\n\n```sql\n{}\n```\n", title, sql);
        }

        ReportOutput::new("Database Schema Report", body)
    }
}

fn markdown_table(result: &QueryResult) -> String {
    format_as_markdown(&result.column_names(), &result.rows)
}

/// Nest a standalone markdown document one level under the report's own headings.
fn demote_headings(markdown: &str) -> String {
    markdown
        .lines()
        .filter(|line| !line.starts_with("# "))
        .map(|line| {
            if line.starts_with('#') {
                format!("#{}\n", line)
            } else {
                format!("{}\n", line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqlEngine;
    use crate::tools::sql_validator::SafetyGate;
    use crate::tools::test_support::static_state;

    #[test]
    fn test_query_patterns_pass_the_gate() {
        for engine in [SqlEngine::Postgres, SqlEngine::Sqlite] {
            let gate = SafetyGate::new(engine);
            for (title, sql) in QUERY_PATTERNS {
                assert!(gate.validate(sql).is_ok(), "{} rejected on {:?}", title, engine);
            }
        }
    }

    #[test]
    fn test_demote_headings() {
        let doc = "# Database Schema\n## employee\n- id\n### Keys\n";
        assert_eq!(demote_headings(doc), "### employee\n- id\n#### Keys\n");
    }

    #[tokio::test]
    async fn test_department_report_counts() {
        let handler = ReportToolHandler::new(static_state().await);
        let report = handler.department_report().await.unwrap();
        assert_eq!(report.title, "Department Analysis Report");
        assert!(report.markdown.starts_with("# Department Analysis Report"));
        assert!(report.markdown.contains("| id | name | location | employees | projects |"));
        // Engineering has Alice and Bob.
        assert!(report.markdown.contains("| 1 | Engineering | Building A | 2 |"));
        assert!(report.markdown.contains("ask_database"));
    }

    #[tokio::test]
    async fn test_schema_report_lists_relationships() {
        let handler = ReportToolHandler::new(static_state().await);
        let report = handler.schema_report();
        assert!(report.markdown.contains("- employee.department_id → department.id"));
        assert!(report.markdown.contains("- employee.role_id → role.id"));
        assert!(report.markdown.contains("- project.department_id → department.id"));
        assert!(report.markdown.contains("```sql\nSELECT e.name, d.name AS department"));
        assert_eq!(report.markdown.matches("\n# ").count(), 0);
    }
}
