//! Built-in catalog of the organization schema.
//!
//! The catalog is the source of the table whitelist and the fallback schema
//! description when the live database cannot be introspected.

use crate::models::{ColumnDefinition, SchemaSnapshot, SchemaSource, TableSchema};

/// Tables eligible for query and introspection, in display order.
pub const TABLE_NAMES: [&str; 4] = ["department", "role", "employee", "project"];

struct ColumnSpec {
    name: &'static str,
    data_type: &'static str,
    nullable: bool,
    primary_key: bool,
    references: Option<(&'static str, &'static str)>,
}

struct TableSpec {
    name: &'static str,
    description: &'static str,
    columns: &'static [ColumnSpec],
}

const fn col(name: &'static str, data_type: &'static str, nullable: bool) -> ColumnSpec {
    ColumnSpec {
        name,
        data_type,
        nullable,
        primary_key: false,
        references: None,
    }
}

const fn pk(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        data_type: "integer",
        nullable: false,
        primary_key: true,
        references: None,
    }
}

const fn fk(name: &'static str, table: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        data_type: "integer",
        nullable: true,
        primary_key: false,
        references: Some((table, "id")),
    }
}

static CATALOG: [TableSpec; 4] = [
    TableSpec {
        name: "department",
        description: "Organizational departments and their office location",
        columns: &[
            pk("id"),
            col("name", "varchar(100)", false),
            col("location", "varchar(100)", true),
        ],
    },
    TableSpec {
        name: "role",
        description: "Job titles with their salary band",
        columns: &[
            pk("id"),
            col("title", "varchar(100)", false),
            col("salary_range", "varchar(50)", true),
        ],
    },
    TableSpec {
        name: "employee",
        description: "Employees, each belonging to one department and holding one role",
        columns: &[
            pk("id"),
            col("name", "varchar(100)", false),
            col("email", "varchar(100)", true),
            fk("department_id", "department"),
            fk("role_id", "role"),
            col("hire_date", "date", true),
        ],
    },
    TableSpec {
        name: "project",
        description: "Projects owned by a department",
        columns: &[
            pk("id"),
            col("name", "varchar(100)", false),
            col("description", "text", true),
            fk("department_id", "department"),
            col("status", "varchar(20)", true),
        ],
    },
];

/// Resolve a user-supplied table name to its canonical whitelisted spelling.
///
/// Only the returned `&'static str` may be interpolated into SQL text.
pub fn canonical_table(name: &str) -> Option<&'static str> {
    let name = name.trim().trim_matches('"');
    TABLE_NAMES
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(name))
}

pub fn is_whitelisted(name: &str) -> bool {
    canonical_table(name).is_some()
}

pub fn description(table: &str) -> &'static str {
    CATALOG
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(table))
        .map(|t| t.description)
        .unwrap_or("")
}

/// Schema snapshot built from the static catalog.
pub fn snapshot() -> SchemaSnapshot {
    let tables = CATALOG
        .iter()
        .map(|spec| TableSchema {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            columns: spec
                .columns
                .iter()
                .map(|c| {
                    let column = ColumnDefinition::new(c.name, c.data_type, c.nullable)
                        .with_primary_key(c.primary_key);
                    match c.references {
                        Some((table, column_name)) => column.with_reference(table, column_name),
                        None => column,
                    }
                })
                .collect(),
        })
        .collect();

    SchemaSnapshot {
        source: SchemaSource::Catalog,
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_matches_catalog() {
        let snapshot = snapshot();
        let names: Vec<&str> = snapshot.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, TABLE_NAMES.to_vec());
    }

    #[test]
    fn test_canonical_table() {
        assert_eq!(canonical_table("Employee"), Some("employee"));
        assert_eq!(canonical_table(" \"role\" "), Some("role"));
        assert_eq!(canonical_table("salaries"), None);
        assert_eq!(canonical_table("employee; DROP TABLE role"), None);
    }

    #[test]
    fn test_foreign_keys() {
        let rels = snapshot().relationships();
        let edges: Vec<String> = rels.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            edges,
            vec![
                "employee.department_id -> department.id",
                "employee.role_id -> role.id",
                "project.department_id -> department.id",
            ]
        );
    }

    #[test]
    fn test_descriptions() {
        assert!(description("project").contains("department"));
        assert_eq!(description("nope"), "");
    }
}
