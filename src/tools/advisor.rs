//! SQL lint and optimization tips.
//!
//! This module implements the `validate_sql` and `get_optimization_tips` MCP tools.
//! Both work on the token stream only and never touch the database.

use crate::db::SqlEngine;
use crate::db::catalog;
use crate::tools::sql_validator::{RejectionReason, SafetyGate, significant_tokens};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlparser::tokenizer::Token;
use std::collections::BTreeSet;

const AGGREGATES: [&str; 5] = ["COUNT", "SUM", "AVG", "MAX", "MIN"];

/// Input for the validate_sql and get_optimization_tips tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SqlTextInput {
    /// SQL statement to analyze. It is not executed.
    pub query: String,
}

/// Why the safety gate would refuse the query.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RejectionOutput {
    pub reason: RejectionReason,
    pub detail: String,
    pub suggestion: String,
}

/// Output from the validate_sql tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ValidateSqlOutput {
    /// True if execute_sql would accept the query
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionOutput>,
    /// Problems that would make the query fail or misbehave
    pub issues: Vec<String>,
    /// Observations that do not block execution
    pub notes: Vec<String>,
    /// Whitelisted tables the query references
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Good,
    Suggestion,
    Warning,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Tip {
    pub kind: TipKind,
    pub message: String,
}

impl Tip {
    fn new(kind: TipKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Output from the get_optimization_tips tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct OptimizationTipsOutput {
    pub tips: Vec<Tip>,
    /// True when no suggestion or warning applies
    pub looks_optimized: bool,
}

fn is_word(token: &Token, word: &str) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word))
}

fn has_word(tokens: &[Token], word: &str) -> bool {
    tokens.iter().any(|t| is_word(t, word))
}

fn count_word(tokens: &[Token], word: &str) -> usize {
    tokens.iter().filter(|t| is_word(t, word)).count()
}

/// `word` immediately followed by `next`, e.g. GROUP BY.
fn has_pair(tokens: &[Token], word: &str, next: &str) -> bool {
    tokens
        .windows(2)
        .any(|w| is_word(&w[0], word) && is_word(&w[1], next))
}

/// Names introduced as `name AS (`, i.e. common table expressions.
fn cte_names(tokens: &[Token]) -> BTreeSet<String> {
    tokens
        .windows(3)
        .filter_map(|w| match (&w[0], &w[2]) {
            (Token::Word(name), Token::LParen) if is_word(&w[1], "AS") => {
                Some(name.value.to_lowercase())
            }
            _ => None,
        })
        .collect()
}

/// Table names following FROM or JOIN, last part of any qualified name.
fn referenced_names(tokens: &[Token]) -> Vec<String> {
    let mut names = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if !(is_word(token, "FROM") || is_word(token, "JOIN")) {
            continue;
        }
        let mut j = i + 1;
        let mut last = None;
        while let Some(Token::Word(w)) = tokens.get(j) {
            last = Some(w.value.clone());
            if matches!(tokens.get(j + 1), Some(Token::Period)) {
                j += 2;
            } else {
                break;
            }
        }
        if let Some(name) = last {
            names.push(name);
        }
    }
    names
}

/// JOINs that need a condition (everything except CROSS and NATURAL joins).
fn conditional_joins(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            is_word(t, "JOIN")
                && !tokens[..*i]
                    .iter()
                    .rev()
                    .take(3)
                    .any(|p| is_word(p, "CROSS") || is_word(p, "NATURAL"))
        })
        .count()
}

/// Lint a query without running it.
pub fn validate_sql(gate: &SafetyGate, sql: &str) -> ValidateSqlOutput {
    let verdict = gate.validate(sql);
    let mut issues = Vec::new();
    let mut notes = Vec::new();

    let tokens = match significant_tokens(gate.engine(), sql) {
        Ok(tokens) => tokens,
        Err(e) => {
            issues.push(format!("Could not tokenize SQL: {}", e));
            Vec::new()
        }
    };

    if !tokens.is_empty() {
        if !has_word(&tokens, "FROM") {
            issues.push("Missing FROM clause".to_string());
        }

        let open = tokens.iter().filter(|t| matches!(t, Token::LParen)).count();
        let close = tokens.iter().filter(|t| matches!(t, Token::RParen)).count();
        if open != close {
            issues.push(format!(
                "Unbalanced parentheses ({} opening, {} closing)",
                open, close
            ));
        }

        let joins = conditional_joins(&tokens);
        let conditions = count_word(&tokens, "ON") + count_word(&tokens, "USING");
        if joins > conditions {
            issues.push("JOIN without an ON or USING condition".to_string());
        }
        if joins > 0 {
            notes.push(format!("Uses {} JOIN(s)", joins));
        }

        let ctes = cte_names(&tokens);
        let mut unknown = BTreeSet::new();
        for name in referenced_names(&tokens) {
            if !catalog::is_whitelisted(&name) && !ctes.contains(&name.to_lowercase()) {
                unknown.insert(name);
            }
        }
        for name in unknown {
            issues.push(format!(
                "Unknown table '{}'. Available tables: {}",
                name,
                catalog::TABLE_NAMES.join(", ")
            ));
        }
    }

    let (tables, rejection) = match verdict {
        Ok(query) => {
            match query.declared_limit() {
                Some(limit) => notes.push(format!("Declared LIMIT {}", limit)),
                None => notes.push(format!(
                    "No LIMIT: execute_sql returns at most {} rows; use paginated_query to browse everything",
                    gate.max_rows()
                )),
            }
            (query.tables().to_vec(), None)
        }
        Err(rejection) => {
            let tables = referenced_names(&tokens)
                .iter()
                .filter_map(|name| catalog::canonical_table(name))
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let suggestion = rejection.suggestion();
            (
                tables,
                Some(RejectionOutput {
                    reason: rejection.reason,
                    detail: rejection.detail,
                    suggestion,
                }),
            )
        }
    };

    for table in &tables {
        notes.push(format!("References table: {}", table));
    }

    ValidateSqlOutput {
        valid: rejection.is_none(),
        rejection,
        issues,
        notes,
        tables,
    }
}

/// Heuristic performance advice from the token stream.
pub fn optimization_tips(engine: SqlEngine, sql: &str) -> OptimizationTipsOutput {
    let tokens = significant_tokens(engine, sql).unwrap_or_default();
    let mut tips = Vec::new();

    let select_star = tokens.windows(2).any(|w| {
        (is_word(&w[0], "SELECT") || is_word(&w[0], "DISTINCT")) && matches!(w[1], Token::Mul)
    });
    if select_star {
        tips.push(Tip::new(
            TipKind::Suggestion,
            "Avoid SELECT *; list only the columns you need",
        ));
    }

    if has_word(&tokens, "JOIN") {
        tips.push(Tip::new(
            TipKind::Good,
            "Uses JOINs; make sure the join keys (department_id, role_id) are indexed",
        ));
        tips.push(Tip::new(
            TipKind::Suggestion,
            "Use short table aliases (e.g. 'e' for employee) for readability",
        ));
    }

    if has_word(&tokens, "WHERE") {
        tips.push(Tip::new(
            TipKind::Good,
            "Filters with WHERE; prefer conditions on indexed columns",
        ));
    } else if has_word(&tokens, "FROM") {
        tips.push(Tip::new(
            TipKind::Suggestion,
            "No WHERE clause: every row of the table is read",
        ));
    }

    let aggregates = tokens.windows(2).any(|w| {
        matches!(w[1], Token::LParen) && AGGREGATES.iter().any(|agg| is_word(&w[0], agg))
    });
    if aggregates && !has_pair(&tokens, "GROUP", "BY") {
        let plain_columns = tokens
            .iter()
            .take_while(|t| !is_word(t, "FROM"))
            .any(|t| matches!(t, Token::Comma));
        if plain_columns {
            tips.push(Tip::new(
                TipKind::Warning,
                "Aggregate mixed with other columns but no GROUP BY; verify this is intended",
            ));
        }
    }

    if has_word(&tokens, "SELECT") && !has_word(&tokens, "LIMIT") && !has_word(&tokens, "FETCH")
    {
        tips.push(Tip::new(
            TipKind::Suggestion,
            "Add a LIMIT, or use paginated_query for large result sets",
        ));
    }

    if has_word(&tokens, "DISTINCT") {
        tips.push(Tip::new(
            TipKind::Warning,
            "DISTINCT sorts or hashes the whole result; use it only when needed",
        ));
    }

    let leading_wildcard = tokens.windows(2).any(|w| {
        (is_word(&w[0], "LIKE") || is_word(&w[0], "ILIKE"))
            && matches!(&w[1], Token::SingleQuotedString(s) if s.starts_with('%'))
    });
    if leading_wildcard {
        tips.push(Tip::new(
            TipKind::Warning,
            "LIKE pattern starting with '%' cannot use an index",
        ));
    }

    let looks_optimized = tips.iter().all(|t| t.kind == TipKind::Good);
    if tips.is_empty() {
        tips.push(Tip::new(TipKind::Good, "Query looks well-optimized"));
    }

    OptimizationTipsOutput {
        tips,
        looks_optimized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SafetyGate {
        SafetyGate::new(SqlEngine::Sqlite)
    }

    fn messages(output: &OptimizationTipsOutput, kind: TipKind) -> Vec<&str> {
        output
            .tips
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.message.as_str())
            .collect()
    }

    #[test]
    fn test_valid_query() {
        let out = validate_sql(
            &gate(),
            "SELECT e.name, d.name FROM employee e JOIN department d ON e.department_id = d.id LIMIT 10",
        );
        assert!(out.valid);
        assert!(out.issues.is_empty());
        assert_eq!(out.tables, vec!["department", "employee"]);
        assert!(out.notes.iter().any(|n| n == "Declared LIMIT 10"));
        assert!(out.notes.iter().any(|n| n.starts_with("Uses 1 JOIN")));
    }

    #[test]
    fn test_missing_from_and_parens() {
        let out = validate_sql(&gate(), "SELECT COUNT(*");
        assert!(!out.valid);
        assert_eq!(out.rejection.unwrap().reason, RejectionReason::Syntax);
        assert!(out.issues.iter().any(|i| i == "Missing FROM clause"));
        assert!(out.issues.iter().any(|i| i.starts_with("Unbalanced parentheses")));
    }

    #[test]
    fn test_join_without_condition() {
        let out = validate_sql(&gate(), "SELECT * FROM employee JOIN role");
        assert!(out.issues.iter().any(|i| i.contains("ON or USING")));

        let out = validate_sql(&gate(), "SELECT * FROM employee CROSS JOIN role");
        assert!(!out.issues.iter().any(|i| i.contains("ON or USING")));
    }

    #[test]
    fn test_unknown_table() {
        let out = validate_sql(&gate(), "SELECT * FROM salaries");
        assert!(!out.valid);
        let rejection = out.rejection.unwrap();
        assert_eq!(rejection.reason, RejectionReason::TableNotAllowed);
        assert!(out.issues.iter().any(|i| i.contains("Unknown table 'salaries'")));
    }

    #[test]
    fn test_write_statement_reports_rejection() {
        let out = validate_sql(&gate(), "DELETE FROM employee");
        assert!(!out.valid);
        assert_eq!(out.rejection.unwrap().reason, RejectionReason::NotSelect);
        assert_eq!(out.tables, vec!["employee"]);
    }

    #[test]
    fn test_tips_for_naive_query() {
        let out = optimization_tips(SqlEngine::Postgres, "SELECT DISTINCT * FROM employee");
        assert!(!out.looks_optimized);
        let suggestions = messages(&out, TipKind::Suggestion);
        assert!(suggestions.iter().any(|m| m.contains("SELECT *")));
        assert!(suggestions.iter().any(|m| m.contains("No WHERE")));
        assert!(suggestions.iter().any(|m| m.contains("LIMIT")));
        assert!(messages(&out, TipKind::Warning).iter().any(|m| m.contains("DISTINCT")));
    }

    #[test]
    fn test_tips_leading_wildcard() {
        let out = optimization_tips(
            SqlEngine::Postgres,
            "SELECT name FROM employee WHERE name ILIKE '%smith' LIMIT 5",
        );
        assert!(messages(&out, TipKind::Warning).iter().any(|m| m.contains("'%'")));
    }

    #[test]
    fn test_tips_aggregate_without_group_by() {
        let out = optimization_tips(
            SqlEngine::Sqlite,
            "SELECT department_id, COUNT(*) FROM employee WHERE id > 0 LIMIT 5",
        );
        assert!(messages(&out, TipKind::Warning).iter().any(|m| m.contains("GROUP BY")));

        let out = optimization_tips(
            SqlEngine::Sqlite,
            "SELECT COUNT(*) FROM employee WHERE id > 0 LIMIT 1",
        );
        assert!(!messages(&out, TipKind::Warning).iter().any(|m| m.contains("GROUP BY")));
    }

    #[test]
    fn test_tips_clean_query() {
        let out = optimization_tips(
            SqlEngine::Sqlite,
            "SELECT name FROM department WHERE id = 1 LIMIT 1",
        );
        assert!(out.looks_optimized);
        assert_eq!(out.tips.len(), 1);
    }
}
