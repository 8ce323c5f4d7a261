//! Natural-language tools.
//!
//! This module implements `ask_database` (generate, validate, run) and
//! `generate_sql_query` (generate and validate only). Generated SQL gets no special
//! treatment: it passes the same safety gate as anything a client sends.

use crate::error::{AgentError, AgentResult};
use crate::llm::SqlGenerator;
use crate::tools::AppState;
use crate::tools::advisor::RejectionOutput;
use crate::tools::query::ColumnMetadataOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for the ask_database and generate_sql_query tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QuestionInput {
    /// Question about departments, roles, employees or projects, in plain language
    pub question: String,
}

/// Output from the ask_database tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AskDatabaseOutput {
    pub question: String,
    /// The generated statement as executed
    pub sql: String,
    pub columns: Vec<ColumnMetadataOutput>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub row_count: usize,
    pub truncated: bool,
    pub execution_time_ms: u64,
    pub model: String,
}

/// Output from the generate_sql_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GenerateSqlOutput {
    pub question: String,
    pub sql: String,
    /// True if execute_sql would accept the generated statement
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionOutput>,
    pub model: String,
}

pub struct GenerateToolHandler {
    state: Arc<AppState>,
}

impl GenerateToolHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn generator(&self) -> AgentResult<&Arc<dyn SqlGenerator>> {
        self.state
            .generator
            .as_ref()
            .ok_or_else(|| AgentError::llm("No LLM API key is configured"))
    }

    async fn generate(&self, question: &str) -> AgentResult<String> {
        if question.trim().is_empty() {
            return Err(AgentError::validation(
                "Question is empty",
                "Ask a question about departments, roles, employees or projects",
            ));
        }
        let generator = self.generator()?;
        generator
            .generate(
                question,
                &self.state.schema.to_markdown(),
                self.state.executor.engine(),
            )
            .await
    }

    pub async fn ask_database(&self, input: QuestionInput) -> AgentResult<AskDatabaseOutput> {
        let sql = self.generate(&input.question).await?;

        let query = self.state.executor.gate().validate(&sql).map_err(|rejection| {
            warn!(reason = ?rejection.reason, "Generated SQL rejected");
            let suggestion = rejection.suggestion();
            AgentError::validation(
                format!("Generated SQL was rejected: {} (SQL: {})", rejection.detail, sql),
                suggestion,
            )
        })?;

        let result = self.state.executor.execute(&query).await?;
        info!(
            tool = "ask_database",
            rows = result.row_count(),
            elapsed_ms = result.execution_time_ms,
            "Question answered"
        );

        Ok(AskDatabaseOutput {
            question: input.question,
            sql: query.sql().to_string(),
            row_count: result.row_count(),
            truncated: result.truncated,
            execution_time_ms: result.execution_time_ms,
            columns: result.columns.into_iter().map(Into::into).collect(),
            rows: result.rows,
            model: self.generator()?.model().to_string(),
        })
    }

    pub async fn generate_sql_query(&self, input: QuestionInput) -> AgentResult<GenerateSqlOutput> {
        let sql = self.generate(&input.question).await?;
        let verdict = self.state.executor.gate().validate(&sql);

        let (sql, rejection) = match verdict {
            Ok(query) => (query.sql().to_string(), None),
            Err(rejection) => {
                let suggestion = rejection.suggestion();
                (
                    sql,
                    Some(RejectionOutput {
                        reason: rejection.reason,
                        detail: rejection.detail,
                        suggestion,
                    }),
                )
            }
        };

        Ok(GenerateSqlOutput {
            question: input.question,
            sql,
            valid: rejection.is_none(),
            rejection,
            model: self.generator()?.model().to_string(),
        })
    }
}
