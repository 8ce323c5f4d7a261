//! Natural-language to SQL generation.
//!
//! The generator only produces text. Everything it returns still goes through the
//! safety gate before it can run.

use crate::config::LlmConfig;
use crate::db::SqlEngine;
use crate::error::{AgentError, AgentResult};
use crate::models::MAX_ROW_LIMIT;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Turns a question into a single SQL statement.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(
        &self,
        question: &str,
        schema_markdown: &str,
        engine: SqlEngine,
    ) -> AgentResult<String>;

    /// Model identifier, for status reporting.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible chat completions client (OpenRouter by default).
pub struct OpenRouterGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenRouterGenerator {
    pub fn new(config: LlmConfig) -> AgentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::llm(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SqlGenerator for OpenRouterGenerator {
    async fn generate(
        &self,
        question: &str,
        schema_markdown: &str,
        engine: SqlEngine,
    ) -> AgentResult<String> {
        debug!(model = %self.config.model, "Requesting SQL generation");

        let request = ChatRequest {
            model: &self.config.model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(question, schema_markdown, engine),
            }],
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::llm(format!("Request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::llm(format!(
                "Provider returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::llm(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::llm("Empty response from provider"))?;

        let sql = clean_sql(&content);
        if sql.is_empty() {
            return Err(AgentError::llm("Provider returned no SQL"));
        }
        debug!(sql = %sql, "Generated SQL");
        Ok(sql)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Build the generation prompt.
pub fn build_prompt(question: &str, schema_markdown: &str, engine: SqlEngine) -> String {
    let ilike = engine.ilike();
    format!(
        "You are an expert SQL generator for a {dialect} database.\n\n\
         {schema}\n\
         User question: {question}\n\n\
         Rules:\n\
         1. Return ONLY the SQL query. No markdown, no explanations.\n\
         2. Write exactly one SELECT statement. Never modify data.\n\
         3. Use {ilike} with '%' wildcards for string comparisons, not '='.\n\
         4. Only use the tables and columns listed in the schema.\n\
         5. Add LIMIT {limit} or less.\n",
        dialect = engine.name(),
        schema = schema_markdown,
        question = question.trim(),
        ilike = ilike,
        limit = MAX_ROW_LIMIT,
    )
}

/// Strip markdown fences and trailing prose from a model reply.
pub fn clean_sql(content: &str) -> String {
    let mut text = content.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        // Skip the info string ("sql") on the opening fence line.
        let body = after.split_once('\n').map(|(_, rest)| rest).unwrap_or(after);
        text = body.split("```").next().unwrap_or(body);
    }

    let text = text.trim();
    let text = match text.find(";\n") {
        Some(end) => &text[..=end],
        None => text,
    };
    text.trim().to_string()
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_plain_sql() {
        assert_eq!(clean_sql("  SELECT 1  "), "SELECT 1");
    }

    #[test]
    fn test_clean_fenced_sql() {
        let reply = "Here you go:\n```sql\nSELECT name FROM employee LIMIT 5;\n```\nThis lists names.";
        assert_eq!(clean_sql(reply), "SELECT name FROM employee LIMIT 5;");
    }

    #[test]
    fn test_clean_trailing_prose() {
        let reply = "SELECT * FROM department;\nThis returns all departments.";
        assert_eq!(clean_sql(reply), "SELECT * FROM department;");
    }

    #[test]
    fn test_prompt_uses_dialect_operator() {
        let pg = build_prompt("who works in hr?", "# Database Schema", SqlEngine::Postgres);
        assert!(pg.contains("ILIKE"));
        assert!(pg.contains("PostgreSQL"));
        assert!(pg.contains("LIMIT 50"));

        let lite = build_prompt("who works in hr?", "# Database Schema", SqlEngine::Sqlite);
        assert!(lite.contains("Use LIKE"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
