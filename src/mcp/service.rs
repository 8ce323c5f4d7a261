//! MCP service implementation using rmcp.
//!
//! This module defines the OrgSqlService struct with all tools and resources
//! exposed via the MCP protocol using the rmcp framework's macros. Prompts live
//! in [`super::prompts`].

use crate::models::PageResult;
use crate::tools::AppState;
use crate::tools::advisor::{self, OptimizationTipsOutput, SqlTextInput, ValidateSqlOutput};
use crate::tools::directory::{ListDepartmentsOutput, ListEmployeesInput, ListEmployeesOutput};
use crate::tools::generate::{AskDatabaseOutput, GenerateSqlOutput, QuestionInput};
use crate::tools::pagination::{
    ClearSessionOutput, GotoPageInput, ListSessionsOutput, PaginatedQueryInput, SessionInput,
};
use crate::tools::query::{ExecuteSqlInput, ExecuteSqlOutput, RunQueryInput, RunQueryOutput};
use crate::tools::report::ReportOutput;
use crate::tools::schema::{
    DbStatusOutput, GetSchemaOutput, GetTableInfoInput, GetTableInfoOutput, ListTablesOutput,
};
use crate::tools::{
    DirectoryToolHandler, GenerateToolHandler, PaginationToolHandler, QueryToolHandler,
    ReportToolHandler, SchemaToolHandler,
};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::router::prompt::PromptRouter,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        AnnotateAble, GetPromptRequestParam, GetPromptResult, Implementation,
        ListPromptsResult, ListResourcesResult, PaginatedRequestParam, ProtocolVersion,
        RawResource, ReadResourceRequestParam, ReadResourceResult, Resource,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    prompt_handler,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::resources::{self, RESOURCES};

#[derive(Clone)]
pub struct OrgSqlService {
    /// Backend, sessions, schema and generator shared by all tools
    state: Arc<AppState>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
    /// Prompt templates (see `prompts.rs`)
    prompt_router: PromptRouter<Self>,
}

impl OrgSqlService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    fn resource_list() -> Vec<Resource> {
        RESOURCES
            .iter()
            .map(|spec| {
                let mut raw = RawResource::new(spec.uri, spec.name.to_string());
                raw.description = Some(spec.description.to_string());
                raw.mime_type = Some(spec.mime_type.to_string());
                raw.no_annotation()
            })
            .collect()
    }
}

#[tool_router]
impl OrgSqlService {
    #[tool(
        description = "Answer a question about the organization database in plain language.\nGenerates a SELECT with the configured LLM, validates it and returns the rows with the SQL used.\nIf generation is unavailable, write the SQL yourself and use execute_sql."
    )]
    async fn ask_database(
        &self,
        Parameters(input): Parameters<QuestionInput>,
    ) -> Result<Json<AskDatabaseOutput>, McpError> {
        GenerateToolHandler::new(self.state.clone())
            .ask_database(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Generate SQL for a question without executing it.\nReports whether the statement would pass validation and why not."
    )]
    async fn generate_sql_query(
        &self,
        Parameters(input): Parameters<QuestionInput>,
    ) -> Result<Json<GenerateSqlOutput>, McpError> {
        GenerateToolHandler::new(self.state.clone())
            .generate_sql_query(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Execute one read-only SELECT and return rows as JSON.\nOnly department, role, employee and project may be queried. At most 50 rows are returned; use paginated_query for more."
    )]
    async fn execute_sql(
        &self,
        Parameters(input): Parameters<ExecuteSqlInput>,
    ) -> Result<Json<ExecuteSqlOutput>, McpError> {
        QueryToolHandler::new(self.state.clone())
            .execute_sql(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Execute one read-only SELECT and return a formatted table.\nFormat: markdown (default) or table. Reports the total row count when more than 50 rows match."
    )]
    async fn run_query(
        &self,
        Parameters(input): Parameters<RunQueryInput>,
    ) -> Result<Json<RunQueryOutput>, McpError> {
        QueryToolHandler::new(self.state.clone())
            .run_query(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Start a pagination session over a SELECT and return page 1.\npage_size: 1-50, default 20. Returns session_id for next_page, prev_page, goto_page and clear_session. Sessions expire after 5 minutes without use."
    )]
    async fn paginated_query(
        &self,
        Parameters(input): Parameters<PaginatedQueryInput>,
    ) -> Result<Json<PageResult>, McpError> {
        PaginationToolHandler::new(self.state.clone())
            .paginated_query(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "Next page of a pagination session.\nOn the last page, returns it again with a notice.")]
    async fn next_page(
        &self,
        Parameters(input): Parameters<SessionInput>,
    ) -> Result<Json<PageResult>, McpError> {
        PaginationToolHandler::new(self.state.clone())
            .next_page(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "Previous page of a pagination session.\nOn page 1, returns it again with a notice.")]
    async fn prev_page(
        &self,
        Parameters(input): Parameters<SessionInput>,
    ) -> Result<Json<PageResult>, McpError> {
        PaginationToolHandler::new(self.state.clone())
            .prev_page(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "Jump to a page of a pagination session.\nOut-of-range pages are clamped to the first or last page.")]
    async fn goto_page(
        &self,
        Parameters(input): Parameters<GotoPageInput>,
    ) -> Result<Json<PageResult>, McpError> {
        PaginationToolHandler::new(self.state.clone())
            .goto_page(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "Discard a pagination session. Clearing an unknown session is not an error.")]
    async fn clear_session(
        &self,
        Parameters(input): Parameters<SessionInput>,
    ) -> Json<ClearSessionOutput> {
        Json(
            PaginationToolHandler::new(self.state.clone())
                .clear_session(input)
                .await,
        )
    }

    #[tool(description = "List active pagination sessions with their position and idle time.")]
    async fn list_sessions(&self) -> Json<ListSessionsOutput> {
        Json(
            PaginationToolHandler::new(self.state.clone())
                .list_sessions()
                .await,
        )
    }

    #[tool(description = "Get the database schema: tables, columns, keys and relationships.\nAlso returned as markdown.")]
    async fn get_schema(&self) -> Json<GetSchemaOutput> {
        Json(SchemaToolHandler::new(self.state.clone()).get_schema())
    }

    #[tool(
        description = "Describe one table: columns, row count and up to 5 sample rows.\ntable_name: department, role, employee or project."
    )]
    async fn get_table_info(
        &self,
        Parameters(input): Parameters<GetTableInfoInput>,
    ) -> Result<Json<GetTableInfoOutput>, McpError> {
        SchemaToolHandler::new(self.state.clone())
            .get_table_info(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "List the queryable tables with column and row counts.")]
    async fn list_tables(&self) -> Json<ListTablesOutput> {
        Json(SchemaToolHandler::new(self.state.clone()).list_tables().await)
    }

    #[tool(
        description = "Check backend status: kind (postgres, local, static), connectivity, LLM configuration and active sessions.\nNever reveals credentials."
    )]
    async fn db_status(&self) -> Json<DbStatusOutput> {
        Json(SchemaToolHandler::new(self.state.clone()).db_status().await)
    }

    #[tool(
        description = "List employees with department and role, ordered by id.\nOptional department_id (non-negative integer, see list_departments)."
    )]
    async fn list_employees(
        &self,
        Parameters(input): Parameters<ListEmployeesInput>,
    ) -> Result<Json<ListEmployeesOutput>, McpError> {
        DirectoryToolHandler::new(self.state.clone())
            .list_employees(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "List all departments with their locations.")]
    async fn list_departments(&self) -> Result<Json<ListDepartmentsOutput>, McpError> {
        DirectoryToolHandler::new(self.state.clone())
            .list_departments()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Employee summary report as markdown: every employee with department and role, head counts per department and role, and the schema."
    )]
    async fn employee_report(&self) -> Result<Json<ReportOutput>, McpError> {
        ReportToolHandler::new(self.state.clone())
            .employee_report()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Department analysis report as markdown: each department with location, employee count and project count."
    )]
    async fn department_report(&self) -> Result<Json<ReportOutput>, McpError> {
        ReportToolHandler::new(self.state.clone())
            .department_report()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Schema documentation report as markdown: tables, relationships and common query patterns."
    )]
    async fn schema_report(&self) -> Json<ReportOutput> {
        Json(ReportToolHandler::new(self.state.clone()).schema_report())
    }

    #[tool(
        description = "Check a SQL query without executing it.\nReports whether execute_sql would accept it, plus lint issues (missing FROM, unbalanced parentheses, JOIN without ON, unknown tables)."
    )]
    async fn validate_sql(
        &self,
        Parameters(input): Parameters<SqlTextInput>,
    ) -> Json<ValidateSqlOutput> {
        Json(advisor::validate_sql(
            &self.state.executor.gate(),
            &input.query,
        ))
    }

    #[tool(description = "Performance tips for a SQL query. The query is not executed.")]
    async fn get_optimization_tips(
        &self,
        Parameters(input): Parameters<SqlTextInput>,
    ) -> Json<OptimizationTipsOutput> {
        Json(advisor::optimization_tips(
            self.state.executor.engine(),
            &input.query,
        ))
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for OrgSqlService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "org-sql-mcp".to_owned(),
                title: Some("Org SQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only SQL tools over an organization database (department, role, employee, project).\n\
                \n\
                ## Workflow\n\
                1. Call `get_schema` (or read `schema://database`) to learn the tables\n\
                2. Ask in plain language with `ask_database`, or write a SELECT and run `execute_sql`\n\
                3. For more than 50 rows use `paginated_query`, then `next_page` / `prev_page` / `goto_page`\n\
                4. For ready-made overviews use `employee_report`, `department_report` or `schema_report`\n\
                \n\
                ## Rules\n\
                - One SELECT statement per call; writes and DDL are rejected\n\
                - Only the four tables above can be queried\n\
                - Use ORDER BY for stable pages; sessions expire after 5 idle minutes\n\
                \n\
                ## When something fails\n\
                - Rejected query: follow the suggestion, or check it with `validate_sql`\n\
                - SQL generation unavailable: write the SQL yourself (see `samples://queries`)\n\
                - Backend problems: call `db_status`"
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(Self::resource_list()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        debug!(uri = %uri, "Resource read");
        match resources::render(&uri, &self.state) {
            Some(text) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(text, uri)],
            }),
            None => Err(McpError::resource_not_found(
                format!("Unknown resource '{}'", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}
