//! SQL safety gate.
//!
//! Every piece of user- or LLM-supplied SQL passes through [`SafetyGate::validate`]
//! before it can reach a backend or a pagination session. The gate accepts exactly one
//! read-only `SELECT` over whitelisted tables and returns a [`ValidatedQuery`]; anything
//! else comes back as a [`Rejection`] value.
//!
//! Uses [sqlparser](https://docs.rs/sqlparser/) twice: the tokenizer sees statement
//! separators, placeholders and the top-level `LIMIT` exactly as the engine would (string
//! literals and comments included), and the AST visitor collects every referenced
//! relation and function, however deeply nested.

use crate::db::SqlEngine;
use crate::db::catalog;
use crate::error::AgentError;
use crate::models::MAX_ROW_LIMIT;
use schemars::JsonSchema;
use serde::Serialize;
use sqlparser::ast::{Expr, ObjectName, Query, SetExpr, Statement, Visit, Visitor};
use sqlparser::dialect::{Dialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::collections::{BTreeSet, HashSet};
use std::ops::ControlFlow;

/// Schema qualifiers that resolve to the application tables.
const ALLOWED_SCHEMAS: [&str; 2] = ["public", "main"];

/// Function name prefixes that reach files, large objects or other servers.
const BLOCKED_FUNCTION_PREFIXES: [&str; 3] = ["pg_", "lo_", "dblink"];

const BLOCKED_FUNCTIONS: [&str; 7] = [
    "load_extension",
    "readfile",
    "writefile",
    "set_config",
    "current_setting",
    "fts3_tokenizer",
    "query_to_xml",
];

/// Why a query was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Empty,
    Syntax,
    MultipleStatements,
    NotSelect,
    WriteClause,
    Placeholder,
    TableNotAllowed,
    SchemaNotAllowed,
    FunctionNotAllowed,
    LimitTooLarge,
    LimitNotLiteral,
    InvalidParameter,
}

/// Structured rejection returned by the gate. The caller decides how to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectionReason,
    pub detail: String,
}

impl Rejection {
    fn new(reason: RejectionReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    /// Actionable hint for the client.
    pub fn suggestion(&self) -> String {
        match self.reason {
            RejectionReason::Empty => "Provide a SELECT statement".to_string(),
            RejectionReason::Syntax => {
                "Fix the SQL syntax; validate_sql reports the problem without running it"
                    .to_string()
            }
            RejectionReason::MultipleStatements => {
                "Send exactly one SELECT statement per call".to_string()
            }
            RejectionReason::NotSelect | RejectionReason::WriteClause => {
                "This server is read-only. Only plain SELECT queries are allowed".to_string()
            }
            RejectionReason::Placeholder => {
                "Inline literal values; bind placeholders are not supported".to_string()
            }
            RejectionReason::TableNotAllowed | RejectionReason::SchemaNotAllowed => format!(
                "Query only these tables: {}",
                catalog::TABLE_NAMES.join(", ")
            ),
            RejectionReason::FunctionNotAllowed => {
                "Remove server administration and file access functions".to_string()
            }
            RejectionReason::LimitTooLarge | RejectionReason::LimitNotLiteral => format!(
                "Use LIMIT {} or less, or paginated_query to browse larger results",
                MAX_ROW_LIMIT
            ),
            RejectionReason::InvalidParameter => {
                "Pass a non-negative integer".to_string()
            }
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.detail)
    }
}

impl From<Rejection> for AgentError {
    fn from(rejection: Rejection) -> Self {
        let suggestion = rejection.suggestion();
        AgentError::validation(rejection.detail, suggestion)
    }
}

/// A query that passed the gate.
///
/// Only [`SafetyGate::validate`] can construct one, so holding a `ValidatedQuery`
/// proves the text is a single whitelisted `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    sql: String,
    tables: Vec<String>,
    declared_limit: Option<u64>,
    ordered: bool,
    has_offset: bool,
}

impl ValidatedQuery {
    /// Normalized SQL: comments and trailing separators removed.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Whitelisted tables referenced by the query, sorted.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Top-level `LIMIT` written in the query, if any.
    pub fn declared_limit(&self) -> Option<u64> {
        self.declared_limit
    }

    /// Whether the outermost query has an `ORDER BY`.
    ///
    /// Without one, the row order across separate page fetches is up to the engine.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Whether the outermost query skips rows with `OFFSET` or `LIMIT offset, n`.
    pub fn has_offset(&self) -> bool {
        self.has_offset
    }

    /// True when paging clauses can be appended to the query text itself.
    pub fn accepts_appended_limit(&self) -> bool {
        self.declared_limit.is_none() && !self.has_offset
    }
}

/// Get the sqlparser dialect matching the backend engine.
pub fn dialect_for(engine: SqlEngine) -> Box<dyn Dialect> {
    match engine {
        SqlEngine::Postgres => Box::new(PostgreSqlDialect {}),
        SqlEngine::Sqlite => Box::new(SQLiteDialect {}),
    }
}

/// Tokenize `sql` and drop whitespace and comments.
pub fn significant_tokens(engine: SqlEngine, sql: &str) -> Result<Vec<Token>, String> {
    let dialect = dialect_for(engine);
    let tokens = Tokenizer::new(dialect.as_ref(), sql)
        .tokenize()
        .map_err(|e| e.to_string())?;
    Ok(tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .collect())
}

#[derive(Debug, Clone, Copy)]
pub struct SafetyGate {
    engine: SqlEngine,
    max_rows: u32,
}

impl SafetyGate {
    pub fn new(engine: SqlEngine) -> Self {
        Self {
            engine,
            max_rows: MAX_ROW_LIMIT,
        }
    }

    pub fn engine(&self) -> SqlEngine {
        self.engine
    }

    pub fn max_rows(&self) -> u32 {
        self.max_rows
    }

    /// Validate an arbitrary string.
    ///
    /// Pure: no I/O, no logging, no panics on any input.
    pub fn validate(&self, sql: &str) -> Result<ValidatedQuery, Rejection> {
        use RejectionReason as R;

        let tokens = significant_tokens(self.engine, sql)
            .map_err(|e| Rejection::new(R::Syntax, format!("Could not tokenize SQL: {}", e)))?;

        let Some(last) = tokens.iter().rposition(|t| !matches!(t, Token::SemiColon)) else {
            return Err(Rejection::new(R::Empty, "Empty SQL statement"));
        };
        let body = &tokens[..=last];

        if body.iter().any(|t| matches!(t, Token::SemiColon)) {
            return Err(Rejection::new(
                R::MultipleStatements,
                "Multiple statements are not allowed",
            ));
        }

        match body.first() {
            Some(Token::Word(w)) if w.keyword == Keyword::SELECT => {}
            Some(other) => {
                return Err(Rejection::new(
                    R::NotSelect,
                    format!("Only SELECT statements are allowed (found '{}')", other),
                ));
            }
            None => return Err(Rejection::new(R::Empty, "Empty SQL statement")),
        }

        if let Some(p) = body.iter().find(|t| matches!(t, Token::Placeholder(_))) {
            return Err(Rejection::new(
                R::Placeholder,
                format!("Bind placeholder '{}' is not allowed", p),
            ));
        }

        let declared_limit = declared_limit(body)?;
        if let Some(limit) = declared_limit {
            if limit > self.max_rows as u64 {
                return Err(Rejection::new(
                    R::LimitTooLarge,
                    format!(
                        "LIMIT {} exceeds the maximum of {} rows",
                        limit, self.max_rows
                    ),
                ));
            }
        }

        let dialect = dialect_for(self.engine);
        let mut statements = Parser::parse_sql(dialect.as_ref(), sql)
            .map_err(|e| Rejection::new(R::Syntax, format!("Failed to parse SQL: {}", e)))?;
        if statements.len() != 1 {
            return Err(Rejection::new(
                R::MultipleStatements,
                "Multiple statements are not allowed",
            ));
        }
        let statement = statements.remove(0);
        if !matches!(statement, Statement::Query(_)) {
            return Err(Rejection::new(
                R::NotSelect,
                "Only SELECT statements are allowed",
            ));
        }

        let mut scan = StatementScan::default();
        let _ = statement.visit(&mut scan);

        if let Some(clause) = scan.write_clause {
            return Err(Rejection::new(
                R::WriteClause,
                format!("{} is not allowed in a read-only query", clause),
            ));
        }

        if let Some(func) = scan.functions.iter().find(|f| is_blocked_function(f)) {
            return Err(Rejection::new(
                R::FunctionNotAllowed,
                format!("Function '{}' is not allowed", func),
            ));
        }

        let tables = scan.whitelisted_tables()?;
        let clauses = TopLevelClauses::scan(body);

        Ok(ValidatedQuery {
            sql: statement.to_string(),
            tables,
            declared_limit,
            ordered: clauses.ordered,
            has_offset: clauses.has_offset,
        })
    }
}

/// Validate an integer identifier arriving as a tool argument.
pub fn check_id_parameter(name: &str, value: i64) -> Result<i64, Rejection> {
    if value < 0 {
        return Err(Rejection::new(
            RejectionReason::InvalidParameter,
            format!("{} must be a non-negative integer (got {})", name, value),
        ));
    }
    Ok(value)
}

/// Read the top-level `LIMIT n`, `LIMIT offset, n` or `FETCH FIRST n ROWS`.
fn declared_limit(tokens: &[Token]) -> Result<Option<u64>, Rejection> {
    let not_literal = |found: Option<&Token>| {
        Rejection::new(
            RejectionReason::LimitNotLiteral,
            format!(
                "LIMIT must be an integer literal (found '{}')",
                found.map(|t| t.to_string()).unwrap_or_default()
            ),
        )
    };
    let parse = |token: Option<&Token>| match token {
        Some(Token::Number(n, _)) => n.parse::<u64>().map_err(|_| not_literal(token)),
        other => Err(not_literal(other)),
    };

    let mut depth = 0i32;
    let mut limit = None;
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            Token::Word(w) if depth == 0 && w.keyword == Keyword::LIMIT => {
                let mut value = parse(tokens.get(i + 1))?;
                i += 1;
                if matches!(tokens.get(i + 1), Some(Token::Comma)) {
                    value = parse(tokens.get(i + 2))?;
                    i += 2;
                }
                limit = Some(value);
            }
            Token::Word(w) if depth == 0 && w.keyword == Keyword::FETCH => {
                // FETCH { FIRST | NEXT } [ n ] { ROW | ROWS } ONLY
                limit = Some(match tokens.get(i + 2) {
                    Some(Token::Number(..)) => parse(tokens.get(i + 2))?,
                    _ => 1,
                });
            }
            _ => {}
        }
        i += 1;
    }
    Ok(limit)
}

/// Ordering and offset clauses of the outermost query.
#[derive(Debug, Default)]
struct TopLevelClauses {
    ordered: bool,
    has_offset: bool,
}

impl TopLevelClauses {
    fn scan(tokens: &[Token]) -> Self {
        let mut clauses = Self::default();
        let mut depth = 0i32;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Word(w) if depth == 0 => match w.keyword {
                    Keyword::ORDER if is_keyword(tokens.get(i + 1), Keyword::BY) => {
                        clauses.ordered = true;
                    }
                    Keyword::OFFSET => clauses.has_offset = true,
                    Keyword::LIMIT if matches!(tokens.get(i + 2), Some(Token::Comma)) => {
                        clauses.has_offset = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        clauses
    }
}

fn is_keyword(token: Option<&Token>, keyword: Keyword) -> bool {
    matches!(token, Some(Token::Word(w)) if w.keyword == keyword)
}

fn is_blocked_function(name: &str) -> bool {
    let name = last_part(name);
    BLOCKED_FUNCTION_PREFIXES.iter().any(|p| name.starts_with(p))
        || BLOCKED_FUNCTIONS.contains(&name.as_str())
}

/// Lowercased final component of a possibly qualified, possibly quoted name.
fn last_part(name: &str) -> String {
    name.rsplit('.')
        .next()
        .unwrap_or(name)
        .trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
        .to_ascii_lowercase()
}

/// Everything the gate needs to know about a parsed statement.
#[derive(Default)]
struct StatementScan {
    relations: Vec<String>,
    cte_names: HashSet<String>,
    functions: Vec<String>,
    write_clause: Option<&'static str>,
}

impl StatementScan {
    fn whitelisted_tables(&self) -> Result<Vec<String>, Rejection> {
        let mut tables = BTreeSet::new();
        for relation in &self.relations {
            let parts: Vec<&str> = relation.split('.').collect();
            let name = last_part(relation);

            if parts.len() == 1 && self.cte_names.contains(&name) {
                continue;
            }
            if parts.len() > 1 {
                let schema = last_part(parts[parts.len() - 2]);
                if parts.len() > 2 || !ALLOWED_SCHEMAS.contains(&schema.as_str()) {
                    return Err(Rejection::new(
                        RejectionReason::SchemaNotAllowed,
                        format!("Schema-qualified table '{}' is not allowed", relation),
                    ));
                }
            }
            match catalog::canonical_table(&name) {
                Some(table) => {
                    tables.insert(table.to_string());
                }
                None => {
                    return Err(Rejection::new(
                        RejectionReason::TableNotAllowed,
                        format!("Table '{}' is not in the allowed list", relation),
                    ));
                }
            }
        }
        Ok(tables.into_iter().collect())
    }
}

impl Visitor for StatementScan {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.cte_names
                    .insert(cte.alias.name.value.to_ascii_lowercase());
            }
        }
        if !query.locks.is_empty() {
            self.write_clause.get_or_insert("Row locking (FOR UPDATE/SHARE)");
        }
        check_set_expr(&query.body, &mut self.write_clause);
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        self.relations.push(relation.to_string());
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if let Expr::Function(func) = expr {
            self.functions.push(func.name.to_string());
        }
        ControlFlow::Continue(())
    }
}

fn check_set_expr(body: &SetExpr, found: &mut Option<&'static str>) {
    match body {
        SetExpr::Select(select) => {
            if select.into.is_some() {
                found.get_or_insert("SELECT ... INTO");
            }
        }
        SetExpr::SetOperation { left, right, .. } => {
            check_set_expr(left, found);
            check_set_expr(right, found);
        }
        // Nested queries are visited on their own.
        SetExpr::Query(_) | SetExpr::Values(_) => {}
        _ => {
            found.get_or_insert("A data-modifying statement");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SafetyGate {
        SafetyGate::new(SqlEngine::Sqlite)
    }

    fn pg_gate() -> SafetyGate {
        SafetyGate::new(SqlEngine::Postgres)
    }

    fn reason(sql: &str) -> RejectionReason {
        gate().validate(sql).unwrap_err().reason
    }

    #[test]
    fn test_accepts_simple_select() {
        let q = gate().validate("SELECT * FROM employee").unwrap();
        assert_eq!(q.sql(), "SELECT * FROM employee");
        assert_eq!(q.tables(), &["employee".to_string()]);
        assert_eq!(q.declared_limit(), None);
    }

    #[test]
    fn test_trailing_separator_is_stripped() {
        let q = gate().validate("SELECT name FROM department;  ").unwrap();
        assert_eq!(q.sql(), "SELECT name FROM department");
    }

    #[test]
    fn test_comments_are_dropped() {
        let q = gate()
            .validate("select name -- the name\nfrom employee /* all */")
            .unwrap();
        assert!(!q.sql().contains("--"));
        assert!(!q.sql().contains("/*"));
    }

    #[test]
    fn test_rejects_multiple_statements() {
        assert_eq!(
            reason("SELECT * FROM employee; DROP TABLE employee;"),
            RejectionReason::MultipleStatements
        );
        assert_eq!(
            reason("SELECT 1; SELECT 2"),
            RejectionReason::MultipleStatements
        );
    }

    #[test]
    fn test_separator_inside_literal_is_fine() {
        let q = gate()
            .validate("SELECT name FROM employee WHERE name = 'a;b'")
            .unwrap();
        assert_eq!(q.tables(), &["employee".to_string()]);
    }

    #[test]
    fn test_rejects_non_select() {
        for sql in [
            "DELETE FROM employee",
            "UPDATE employee SET name = 'x'",
            "INSERT INTO role (title) VALUES ('x')",
            "DROP TABLE project",
            "PRAGMA table_info(employee)",
            "WITH x AS (SELECT 1) SELECT * FROM x",
            "EXPLAIN SELECT * FROM employee",
        ] {
            assert_eq!(reason(sql), RejectionReason::NotSelect, "{}", sql);
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(reason(""), RejectionReason::Empty);
        assert_eq!(reason("   "), RejectionReason::Empty);
        assert_eq!(reason(" ; "), RejectionReason::Empty);
        assert_eq!(reason("-- nothing"), RejectionReason::Empty);
    }

    #[test]
    fn test_rejects_unknown_tables() {
        assert_eq!(reason("SELECT * FROM salaries"), RejectionReason::TableNotAllowed);
        assert_eq!(
            reason("SELECT * FROM employee e JOIN sqlite_master m ON 1 = 1"),
            RejectionReason::TableNotAllowed
        );
        assert_eq!(
            reason("SELECT * FROM employee WHERE department_id IN (SELECT id FROM secrets)"),
            RejectionReason::TableNotAllowed
        );
    }

    #[test]
    fn test_schema_qualifiers() {
        let q = pg_gate().validate("SELECT * FROM public.employee").unwrap();
        assert_eq!(q.tables(), &["employee".to_string()]);
        assert_eq!(
            pg_gate()
                .validate("SELECT * FROM information_schema.tables")
                .unwrap_err()
                .reason,
            RejectionReason::SchemaNotAllowed
        );
    }

    #[test]
    fn test_collects_joined_tables() {
        let q = gate()
            .validate(
                "SELECT e.name, d.name FROM employee e \
                 JOIN department d ON e.department_id = d.id \
                 WHERE e.role_id IN (SELECT id FROM role)",
            )
            .unwrap();
        assert_eq!(q.tables(), &["department", "employee", "role"]);
    }

    #[test]
    fn test_cte_names_are_not_tables() {
        let q = gate()
            .validate(
                "SELECT * FROM (WITH recent AS (SELECT * FROM employee) SELECT * FROM recent) AS r",
            )
            .unwrap();
        assert_eq!(q.tables(), &["employee".to_string()]);
    }

    #[test]
    fn test_select_without_tables() {
        let q = gate().validate("SELECT 1 + 1").unwrap();
        assert!(q.tables().is_empty());
    }

    #[test]
    fn test_limits() {
        assert_eq!(
            gate()
                .validate("SELECT * FROM employee LIMIT 50")
                .unwrap()
                .declared_limit(),
            Some(50)
        );
        assert_eq!(
            reason("SELECT * FROM employee LIMIT 51"),
            RejectionReason::LimitTooLarge
        );
        assert_eq!(
            reason("SELECT * FROM employee LIMIT 5, 100"),
            RejectionReason::LimitTooLarge
        );
        assert_eq!(
            pg_gate()
                .validate("SELECT * FROM employee LIMIT ALL")
                .unwrap_err()
                .reason,
            RejectionReason::LimitNotLiteral
        );
        // A subquery limit does not bound the result.
        let q = gate()
            .validate("SELECT * FROM (SELECT * FROM employee LIMIT 500) AS e")
            .unwrap();
        assert_eq!(q.declared_limit(), None);
    }

    #[test]
    fn test_ordering_and_offset_clauses() {
        let q = gate()
            .validate("SELECT name FROM employee ORDER BY id")
            .unwrap();
        assert!(q.is_ordered());
        assert!(!q.has_offset());
        assert!(q.accepts_appended_limit());

        let q = gate().validate("SELECT name FROM employee").unwrap();
        assert!(!q.is_ordered());
        assert!(q.accepts_appended_limit());

        // Ordering inside a subquery or window does not order the result.
        let q = gate()
            .validate(
                "SELECT name, ROW_NUMBER() OVER (ORDER BY salary) AS rn \
                 FROM (SELECT * FROM employee ORDER BY id) AS e",
            )
            .unwrap();
        assert!(!q.is_ordered());

        let q = gate()
            .validate("SELECT name FROM employee ORDER BY id LIMIT 10 OFFSET 2")
            .unwrap();
        assert!(q.is_ordered());
        assert!(q.has_offset());
        assert!(!q.accepts_appended_limit());

        let q = gate()
            .validate("SELECT name FROM employee LIMIT 2, 10")
            .unwrap();
        assert!(q.has_offset());
        assert_eq!(q.declared_limit(), Some(10));

        let q = gate()
            .validate("SELECT name FROM employee ORDER BY id LIMIT 3")
            .unwrap();
        assert!(!q.has_offset());
        assert!(!q.accepts_appended_limit());
    }

    #[test]
    fn test_rejects_blocked_functions() {
        assert_eq!(
            pg_gate()
                .validate("SELECT pg_read_file('/etc/passwd')")
                .unwrap_err()
                .reason,
            RejectionReason::FunctionNotAllowed
        );
        assert_eq!(
            reason("SELECT load_extension('evil')"),
            RejectionReason::FunctionNotAllowed
        );
        assert!(gate().validate("SELECT COUNT(*) FROM employee").is_ok());
    }

    #[test]
    fn test_rejects_write_clauses() {
        assert_eq!(
            pg_gate()
                .validate("SELECT * INTO backup FROM employee")
                .unwrap_err()
                .reason,
            RejectionReason::WriteClause
        );
        assert_eq!(
            pg_gate()
                .validate("SELECT * FROM employee FOR UPDATE")
                .unwrap_err()
                .reason,
            RejectionReason::WriteClause
        );
    }

    #[test]
    fn test_rejects_placeholders() {
        assert_eq!(
            pg_gate()
                .validate("SELECT * FROM employee WHERE id = $1")
                .unwrap_err()
                .reason,
            RejectionReason::Placeholder
        );
        assert_eq!(
            reason("SELECT * FROM employee WHERE id = ?"),
            RejectionReason::Placeholder
        );
    }

    #[test]
    fn test_syntax_error() {
        assert_eq!(
            reason("SELECT * FROM employee WHERE ("),
            RejectionReason::Syntax
        );
    }

    #[test]
    fn test_id_parameter() {
        assert_eq!(check_id_parameter("department_id", 3), Ok(3));
        assert_eq!(check_id_parameter("department_id", 0), Ok(0));
        let err = check_id_parameter("department_id", -1).unwrap_err();
        assert_eq!(err.reason, RejectionReason::InvalidParameter);
    }

    #[test]
    fn test_rejection_converts_to_validation_error() {
        let rejection = gate().validate("DROP TABLE employee").unwrap_err();
        let err: AgentError = rejection.into();
        assert_eq!(err.category(), crate::error::ErrorCategory::Validation);
        assert!(err.suggestion().unwrap().contains("read-only"));
    }
}
