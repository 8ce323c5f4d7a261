//! Org SQL MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools that let AI assistants
//! ask questions about an organization database (departments, roles, employees and
//! projects) in plain language or read-only SQL, over PostgreSQL, a local SQLite
//! file, or a built-in in-memory fixture.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::AgentError;
pub use mcp::OrgSqlService;
