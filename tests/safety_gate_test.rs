//! Integration tests for the SQL safety gate.
//!
//! These tests verify that only single, read-only SELECT statements over the four
//! organization tables get through, for both SQL dialects.

use org_sql_mcp::db::SqlEngine;
use org_sql_mcp::error::{AgentError, ErrorCategory};
use org_sql_mcp::tools::sql_validator::{RejectionReason, SafetyGate};

fn both_gates() -> [SafetyGate; 2] {
    [
        SafetyGate::new(SqlEngine::Postgres),
        SafetyGate::new(SqlEngine::Sqlite),
    ]
}

fn assert_rejected(sql: &str, expected: RejectionReason) {
    for gate in both_gates() {
        let rejection = gate
            .validate(sql)
            .expect_err(&format!("{} should be rejected on {}", sql, gate.engine().name()));
        assert_eq!(rejection.reason, expected, "wrong reason for {}", sql);
    }
}

#[test]
fn test_write_statements_are_rejected() {
    for sql in [
        "INSERT INTO employee (name) VALUES ('x')",
        "UPDATE employee SET name = 'changed' WHERE id = 1",
        "DELETE FROM employee WHERE id = 1",
        "DROP TABLE employee",
        "CREATE TABLE t (id INT)",
        "ALTER TABLE role ADD COLUMN x INT",
        "TRUNCATE employee",
    ] {
        for gate in both_gates() {
            let rejection = gate.validate(sql).unwrap_err();
            assert!(
                matches!(
                    rejection.reason,
                    RejectionReason::NotSelect | RejectionReason::Syntax
                ),
                "{} gave {:?}",
                sql,
                rejection.reason
            );
        }
    }
}

#[test]
fn test_stacked_statements_are_rejected() {
    assert_rejected(
        "SELECT * FROM employee; DROP TABLE employee",
        RejectionReason::MultipleStatements,
    );
    assert_rejected(
        "SELECT 1 FROM role; SELECT 2 FROM role;",
        RejectionReason::MultipleStatements,
    );
}

#[test]
fn test_only_whitelisted_tables() {
    assert_rejected("SELECT * FROM users", RejectionReason::TableNotAllowed);
    assert_rejected(
        "SELECT e.name FROM employee e JOIN salaries s ON s.employee_id = e.id",
        RejectionReason::TableNotAllowed,
    );
    assert_rejected(
        "SELECT * FROM employee WHERE id IN (SELECT employee_id FROM audit_log)",
        RejectionReason::TableNotAllowed,
    );
}

#[test]
fn test_injection_through_literal_stays_a_literal() {
    for gate in both_gates() {
        let query = gate
            .validate("SELECT * FROM employee WHERE name = 'x''; DROP TABLE employee; --'")
            .unwrap();
        assert_eq!(query.tables(), ["employee".to_string()]);
    }
}

#[test]
fn test_row_limit_is_enforced() {
    assert_rejected(
        "SELECT * FROM employee LIMIT 1000",
        RejectionReason::LimitTooLarge,
    );
    for gate in both_gates() {
        assert_eq!(gate.max_rows(), 50);
        let query = gate.validate("SELECT * FROM employee LIMIT 10").unwrap();
        assert_eq!(query.declared_limit(), Some(10));
    }
}

#[test]
fn test_case_and_whitespace_do_not_matter() {
    for gate in both_gates() {
        assert!(gate.validate("  select NAME from EMPLOYEE  ").is_ok());
        assert!(gate.validate("\n\tSELECT *\nFROM department\n;").is_ok());
    }
}

#[test]
fn test_rejection_becomes_validation_error() {
    let gate = SafetyGate::new(SqlEngine::Sqlite);
    let err: AgentError = gate.validate("DELETE FROM project").unwrap_err().into();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.suggestion().unwrap().contains("read-only"));
}
