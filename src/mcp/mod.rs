//! MCP server integration module.
//!
//! This module wires the tool handlers and text resources into an rmcp
//! `ServerHandler`.

pub mod prompts;
pub mod resources;
pub mod service;

pub use service::OrgSqlService;
