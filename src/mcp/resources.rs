//! Read-only text resources.
//!
//! Each resource is rendered on demand from the shared [`AppState`], so the schema and
//! connection details always describe the backend actually in use.

use crate::db::SqlEngine;
use crate::db::catalog;
use crate::models::MAX_ROW_LIMIT;
use crate::tools::AppState;

/// A resource advertised by `resources/list`.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub const RESOURCES: [ResourceSpec; 5] = [
    ResourceSpec {
        uri: "schema://database",
        name: "Database schema",
        description: "Tables, columns, keys and relationships of the organization database",
        mime_type: "text/markdown",
    },
    ResourceSpec {
        uri: "samples://queries",
        name: "Sample queries",
        description: "Example SELECT statements for common questions, in the backend's dialect",
        mime_type: "text/markdown",
    },
    ResourceSpec {
        uri: "config://tools",
        name: "Tool catalog",
        description: "Every tool with its purpose, plus a task-to-tool selection matrix",
        mime_type: "text/markdown",
    },
    ResourceSpec {
        uri: "guide://usage",
        name: "Usage guide",
        description: "Recommended workflows, pagination and error handling",
        mime_type: "text/markdown",
    },
    ResourceSpec {
        uri: "context://connection",
        name: "Connection context",
        description: "Backend in use, read-only guarantees and limits",
        mime_type: "text/markdown",
    },
];

/// Render a resource, or `None` for an unknown URI.
pub fn render(uri: &str, state: &AppState) -> Option<String> {
    match uri {
        "schema://database" => Some(state.schema.to_markdown()),
        "samples://queries" => Some(sample_queries(state.executor.engine())),
        "config://tools" => Some(tool_catalog()),
        "guide://usage" => Some(usage_guide(state.sessions.ttl().as_secs())),
        "context://connection" => Some(connection_context(state)),
        _ => None,
    }
}

pub fn sample_queries(engine: SqlEngine) -> String {
    let like = engine.ilike();
    format!(
        r#"# Sample SQL Queries ({dialect})

## Employees

### Employees with department and role
```sql
SELECT e.name, e.email, d.name AS department, r.title AS role
FROM employee e
JOIN department d ON e.department_id = d.id
JOIN role r ON e.role_id = r.id
ORDER BY e.id
```

### Head count per department
```sql
SELECT d.name AS department, COUNT(e.id) AS employee_count
FROM department d
LEFT JOIN employee e ON d.id = e.department_id
GROUP BY d.name
ORDER BY employee_count DESC
```

### Find employees by name (case-insensitive)
```sql
SELECT id, name, email FROM employee WHERE name {like} '%smith%'
```

## Departments

### Departments and their locations
```sql
SELECT name, location FROM department ORDER BY name
```

## Projects

### Active projects with their department
```sql
SELECT p.name AS project, d.name AS department, p.status
FROM project p
JOIN department d ON p.department_id = d.id
WHERE p.status = 'Active'
```

### Projects per status
```sql
SELECT status, COUNT(*) AS count FROM project GROUP BY status
```

## Roles

### Roles with salary ranges
```sql
SELECT title, salary_range FROM role ORDER BY title
```

## Notes
- Use {like} with '%' wildcards for text matching.
- One SELECT per call; at most {limit} rows per call.
- Add ORDER BY before paging through results with paginated_query.
"#,
        dialect = engine.name(),
        like = like,
        limit = MAX_ROW_LIMIT,
    )
}

pub fn tool_catalog() -> String {
    r#"# Tool Catalog

## Questions in plain language
- **ask_database**: generate SQL for a question, validate it and return the rows.
- **generate_sql_query**: generate SQL for a question and report whether it would be accepted. Nothing is executed.

## Running SQL
- **execute_sql**: run one SELECT and return JSON rows (at most 50).
- **run_query**: run one SELECT and return a markdown or ASCII table.
- **validate_sql**: lint a query without running it.
- **get_optimization_tips**: performance hints for a query.

## Paging through large results
- **paginated_query**: start a session over a SELECT and return page 1.
- **next_page** / **prev_page** / **goto_page**: move within a session.
- **clear_session**: discard a session.
- **list_sessions**: show active sessions.

## Schema and status
- **get_schema**: all tables, columns and relationships.
- **get_table_info**: one table with row count and sample rows.
- **list_tables**: the queryable tables with row counts.
- **db_status**: backend, connectivity and LLM configuration.

## Directory shortcuts
- **list_employees**: employees with department and role, optionally for one department.
- **list_departments**: all departments.

## Reports
- **employee_report**: every employee plus head counts per department and role.
- **department_report**: departments with employee and project counts.
- **schema_report**: tables, relationships and common query patterns.

## Tool Selection Matrix

| Task | Tool |
|---|---|
| Quick answer to a question | ask_database |
| SQL for review, not executed | generate_sql_query |
| Run your own SELECT | execute_sql / run_query |
| More than 50 rows | paginated_query |
| Discover tables and columns | get_schema / get_table_info |
| Check a query before running it | validate_sql |
| Make a query faster | get_optimization_tips |
| Is the database reachable? | db_status |
| Overview for a reader | employee_report / department_report / schema_report |
"#
    .to_string()
}

pub fn usage_guide(session_ttl_secs: u64) -> String {
    format!(
        r#"# Usage Guide

## Recommended workflow
1. Read `schema://database` or call `get_schema` to learn the tables.
2. Ask with `ask_database`, or write a SELECT and run it with `execute_sql`.
3. If a result is cut off at {limit} rows, switch to `paginated_query`.

## Pagination
- `paginated_query(query, page_size)` returns page 1 and a `session_id`.
- `page_size` is clamped to 1-{limit} (default 20).
- `next_page` on the last page returns the last page again with a notice; `prev_page` on page 1 does the same.
- `goto_page` clamps out-of-range page numbers to the first or last page.
- Sessions expire after {ttl} seconds without use; an expired session must be started again.
- Always include ORDER BY so pages are stable. Pages of an unordered query carry a notice.

## Errors
- *Query rejected*: the statement is not a single read-only SELECT over the allowed tables. Follow the suggestion.
- *Not found*: unknown table or session. Call `list_tables` or `list_sessions`.
- *Backend unavailable*: the database could not be reached. Check `db_status`.
- *SQL generation failed*: write the SELECT yourself and use `execute_sql` (see `samples://queries`).

## Prompts
- employee-report, department-analysis, project-status-report: report workflows
- schema-explorer: document the schema
- sql-query-builder (`requirement`): draft, validate and tune a SELECT
- custom-query (`question`): answer one question

## Resources
- schema://database
- samples://queries
- config://tools
- guide://usage
- context://connection
"#,
        limit = MAX_ROW_LIMIT,
        ttl = session_ttl_secs,
    )
}

pub fn connection_context(state: &AppState) -> String {
    let backend = &state.backend;
    let engine = state.executor.engine();
    let location = match (&backend.host, backend.static_mode()) {
        (_, true) => "in-memory fixture (no database configured)".to_string(),
        (Some(host), false) => host.clone(),
        (None, false) => "unknown".to_string(),
    };

    format!(
        r#"# Connection Context

## Backend
- **Kind**: {kind}
- **Engine**: {engine}
- **Location**: {location}
- **Mode**: read-only (SELECT only)
- **LLM generation**: {llm}

## Queryable tables
{tables}

## Guarantees
- One SELECT statement per call; no INSERT, UPDATE, DELETE or DDL.
- Only the tables above; other tables and schemas are rejected.
- At most {limit} rows per call; larger results through paginated_query.
- Connection strings and credentials are never returned.
"#,
        kind = backend.kind,
        engine = engine.name(),
        location = location,
        llm = if state.generator.is_some() {
            "enabled"
        } else {
            "disabled"
        },
        tables = catalog::TABLE_NAMES
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n"),
        limit = MAX_ROW_LIMIT,
    )
}
