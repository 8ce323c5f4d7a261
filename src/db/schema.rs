//! Schema introspection module.
//!
//! Reads the column layout of the whitelisted tables from the live backend once at
//! startup. Only tables named in the catalog are ever inspected. If the backend cannot
//! be introspected, or a table is missing, the static catalog is used instead.
//!
//! SQL queries are organized in the `queries` submodule; engine-specific
//! implementations are in their respective submodules, each providing the same interface.

use crate::db::backend::Backend;
use crate::db::catalog;
use crate::error::{AgentError, AgentResult};
use crate::models::{ColumnDefinition, SchemaSnapshot, SchemaSource, TableSchema};
use tracing::{debug, info, warn};

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// Build the process-wide schema snapshot.
    pub async fn load(backend: &Backend) -> SchemaSnapshot {
        match Self::introspect(backend).await {
            Ok(snapshot) => {
                info!(
                    tables = snapshot.tables.len(),
                    "Schema introspected from backend"
                );
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Schema introspection failed, using built-in catalog");
                catalog::snapshot()
            }
        }
    }

    /// Introspect every whitelisted table; fails if any is absent.
    pub async fn introspect(backend: &Backend) -> AgentResult<SchemaSnapshot> {
        let mut tables = Vec::with_capacity(catalog::TABLE_NAMES.len());
        for table in catalog::TABLE_NAMES {
            let columns = match backend {
                Backend::Postgres(pool) => postgres::describe_table(pool, table).await?,
                Backend::Local(pool) | Backend::Static(pool) => {
                    sqlite::describe_table(pool, table).await?
                }
            };
            if columns.is_empty() {
                return Err(AgentError::internal(format!(
                    "Table '{}' not found in the database",
                    table
                )));
            }
            debug!(table = table, columns = columns.len(), "Described table");
            tables.push(TableSchema {
                name: table.to_string(),
                description: catalog::description(table).to_string(),
                columns,
            });
        }

        Ok(SchemaSnapshot {
            source: SchemaSource::Introspected,
            tables,
        })
    }
}

mod queries {
    pub mod postgres {
        pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            c.column_name,
            c.data_type,
            c.is_nullable,
            EXISTS (
                SELECT 1
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                WHERE tc.constraint_type = 'PRIMARY KEY'
                AND tc.table_schema = c.table_schema
                AND tc.table_name = c.table_name
                AND kcu.column_name = c.column_name
            ) AS is_primary_key
        FROM information_schema.columns c
        WHERE c.table_schema = 'public' AND c.table_name = $1
        ORDER BY c.ordinal_position
        "#;

        pub const DESCRIBE_FOREIGN_KEYS: &str = r#"
        SELECT
            kcu.column_name,
            ccu.table_name AS foreign_table_name,
            ccu.column_name AS foreign_column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        JOIN information_schema.constraint_column_usage ccu
            ON ccu.constraint_name = tc.constraint_name
            AND ccu.table_schema = tc.table_schema
        WHERE tc.table_name = $1
        AND tc.table_schema = 'public'
        AND tc.constraint_type = 'FOREIGN KEY'
        "#;
    }
}

/// Attach foreign-key targets to their columns.
fn apply_references(columns: &mut [ColumnDefinition], references: Vec<(String, String, String)>) {
    for (column, table, target) in references {
        if let Some(col) = columns.iter_mut().find(|c| c.name == column) {
            col.references = Some(crate::models::ForeignKeyRef {
                table,
                column: target,
            });
        }
    }
}

mod postgres {
    use super::*;
    use sqlx::{PgPool, Row};

    pub async fn describe_table(
        pool: &PgPool,
        table: &'static str,
    ) -> AgentResult<Vec<ColumnDefinition>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_COLUMNS)
            .bind(table)
            .fetch_all(pool)
            .await?;

        let mut columns: Vec<ColumnDefinition> = rows
            .iter()
            .map(|row| {
                let name: String = row.get("column_name");
                let data_type: String = row.get("data_type");
                let nullable: String = row.get("is_nullable");
                let is_pk: bool = row.get("is_primary_key");
                ColumnDefinition::new(name, data_type, nullable == "YES").with_primary_key(is_pk)
            })
            .collect();

        let references: Vec<(String, String, String)> =
            sqlx::query(queries::postgres::DESCRIBE_FOREIGN_KEYS)
                .bind(table)
                .fetch_all(pool)
                .await?
                .iter()
                .map(|row| {
                    (
                        row.get("column_name"),
                        row.get("foreign_table_name"),
                        row.get("foreign_column_name"),
                    )
                })
                .collect();
        apply_references(&mut columns, references);

        Ok(columns)
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Row, SqlitePool};

    pub async fn describe_table(
        pool: &SqlitePool,
        table: &'static str,
    ) -> AgentResult<Vec<ColumnDefinition>> {
        // `table` comes from the catalog, never from a client.
        let pragma_query = format!("PRAGMA table_info('{}')", table);
        let rows = sqlx::query(&pragma_query).fetch_all(pool).await?;

        let mut columns: Vec<ColumnDefinition> = rows
            .iter()
            .map(|row| {
                let name: String = row.get("name");
                let data_type: String = row.get("type");
                let notnull: i32 = row.get("notnull");
                let pk: i32 = row.get("pk");
                ColumnDefinition::new(name, data_type.to_lowercase(), notnull == 0 && pk == 0)
                    .with_primary_key(pk > 0)
            })
            .collect();

        let fk_query = format!("PRAGMA foreign_key_list('{}')", table);
        let references: Vec<(String, String, String)> = sqlx::query(&fk_query)
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| (row.get("from"), row.get("table"), row.get("to")))
            .collect();
        apply_references(&mut columns, references);

        Ok(columns)
    }
}
