//! Schema-related data models.
//!
//! This module defines the immutable schema snapshot served by `get_schema`,
//! `get_table_info` and the `schema://database` resource.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Column referenced by a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDefinition {
    pub name: String,
    /// Database-specific type (e.g., "integer", "VARCHAR(100)")
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyRef>,
}

impl ColumnDefinition {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            is_primary_key: false,
            references: None,
        }
    }

    /// Mark the column as (part of) the primary key.
    pub fn with_primary_key(mut self, is_pk: bool) -> Self {
        self.is_primary_key = is_pk;
        self
    }

    /// Attach a foreign key reference.
    pub fn with_reference(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub name: String,
    pub description: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// A foreign-key edge between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }
}

/// Where a schema snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    /// Built-in catalog
    Catalog,
    /// Read from the live database at startup
    Introspected,
}

/// Immutable view of the queryable schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaSnapshot {
    pub source: SchemaSource,
    pub tables: Vec<TableSchema>,
}

impl SchemaSnapshot {
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// All foreign-key edges, in table order.
    pub fn relationships(&self) -> Vec<Relationship> {
        self.tables
            .iter()
            .flat_map(|t| {
                t.columns.iter().filter_map(move |c| {
                    c.references.as_ref().map(|r| Relationship {
                        from_table: t.name.clone(),
                        from_column: c.name.clone(),
                        to_table: r.table.clone(),
                        to_column: r.column.clone(),
                    })
                })
            })
            .collect()
    }

    /// Render the schema as markdown for resources and LLM prompts.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Database Schema\n");

        for table in &self.tables {
            out.push_str(&format!("\n## {}\n", table.name));
            if !table.description.is_empty() {
                out.push_str(&format!("{}\n", table.description));
            }
            out.push('\n');
            out.push_str("| Column | Type | Nullable | Key |\n|---|---|---|---|\n");
            for col in &table.columns {
                let key = match (&col.references, col.is_primary_key) {
                    (_, true) => "PK".to_string(),
                    (Some(r), false) => format!("FK -> {}.{}", r.table, r.column),
                    (None, false) => String::new(),
                };
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    col.name,
                    col.data_type,
                    if col.nullable { "YES" } else { "NO" },
                    key
                ));
            }
        }

        let relationships = self.relationships();
        if !relationships.is_empty() {
            out.push_str("\n## Relationships\n");
            for rel in relationships {
                out.push_str(&format!("- {}\n", rel));
            }
        }

        out
    }
}
