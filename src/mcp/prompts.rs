//! Prompt templates.
//!
//! Each prompt is a workflow over this server's tools that a client can hand to its
//! model as a starting message. Prompts never touch the database themselves.

use super::OrgSqlService;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{PromptMessage, PromptMessageRole},
    prompt, prompt_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

/// Arguments for the sql-query-builder prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SqlBuilderArgs {
    /// What the query should return, in plain language
    pub requirement: String,
}

/// Arguments for the custom-query prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CustomQueryArgs {
    /// The question to answer from the database
    pub question: String,
}

fn user_message(text: String) -> Vec<PromptMessage> {
    vec![PromptMessage::new_text(PromptMessageRole::User, text)]
}

#[prompt_router(vis = "pub(crate)")]
impl OrgSqlService {
    fn table_names(&self) -> String {
        self.state()
            .schema
            .tables
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[prompt(
        name = "employee-report",
        title = "Employee Report",
        description = "Employee summary report with department and role breakdown"
    )]
    async fn employee_report_prompt(&self) -> Vec<PromptMessage> {
        info!(prompt = "employee-report", "Prompt requested");
        user_message(
            "Generate an Employee Summary Report.\n\
             \n\
             WORKFLOW:\n\
             1. Call `employee_report` for the employee, department and role tables\n\
             2. Use `ask_database` for anything the report does not cover, such as hires per year\n\
             3. Format the results as a professional report with tables\n\
             \n\
             OUTPUT:\n\
             - Executive summary\n\
             - Department breakdown table\n\
             - Role distribution table\n\
             - Key insights and recommendations"
                .to_string(),
        )
    }

    #[prompt(
        name = "sql-query-builder",
        title = "SQL Query Builder",
        description = "Build a validated, optimized SELECT from a plain-language requirement"
    )]
    async fn sql_query_builder_prompt(
        &self,
        params: Parameters<SqlBuilderArgs>,
    ) -> Vec<PromptMessage> {
        info!(prompt = "sql-query-builder", "Prompt requested");
        user_message(format!(
            "Build a SQL query.\n\
             \n\
             REQUIREMENT: {requirement}\n\
             \n\
             WORKFLOW:\n\
             1. Call `get_schema` to see the tables ({tables})\n\
             2. Call `generate_sql_query` with the requirement\n\
             3. Check the statement with `validate_sql`\n\
             4. Call `get_optimization_tips` for performance suggestions\n\
             \n\
             OUTPUT:\n\
             - The SQL query in a code block\n\
             - What it returns\n\
             - Any optimization suggestions",
            requirement = params.0.requirement.trim(),
            tables = self.table_names(),
        ))
    }

    #[prompt(
        name = "department-analysis",
        title = "Department Analysis",
        description = "Analyze departments: head counts, projects and resources"
    )]
    async fn department_analysis_prompt(&self) -> Vec<PromptMessage> {
        info!(prompt = "department-analysis", "Prompt requested");
        user_message(
            "Analyze all departments.\n\
             \n\
             WORKFLOW:\n\
             1. Call `department_report` for each department's employee and project counts\n\
             2. Use `ask_database`: \"Which department has the most active projects?\"\n\
             3. Use `list_employees` with a department_id to look at one team\n\
             \n\
             OUTPUT:\n\
             - Department overview table\n\
             - Employee distribution\n\
             - Project allocation insights\n\
             - Resource recommendations"
                .to_string(),
        )
    }

    #[prompt(
        name = "schema-explorer",
        title = "Database Schema Explorer",
        description = "Explore and document the database structure"
    )]
    async fn schema_explorer_prompt(&self) -> Vec<PromptMessage> {
        info!(prompt = "schema-explorer", "Prompt requested");
        user_message(format!(
            "Explore the database schema.\n\
             \n\
             WORKFLOW:\n\
             1. Call `schema_report` for tables, relationships and query patterns\n\
             2. Call `get_table_info` on each table ({tables}) for row counts and sample rows\n\
             3. Map the foreign key relationships\n\
             4. Document what each table holds\n\
             \n\
             OUTPUT:\n\
             - Schema diagram description\n\
             - Table summaries with column types\n\
             - Relationship map\n\
             - Common query patterns for this schema",
            tables = self.table_names(),
        ))
    }

    #[prompt(
        name = "project-status-report",
        title = "Project Status Report",
        description = "Status report for all projects with department allocation"
    )]
    async fn project_status_report_prompt(&self) -> Vec<PromptMessage> {
        info!(prompt = "project-status-report", "Prompt requested");
        user_message(
            "Generate a Project Status Report.\n\
             \n\
             WORKFLOW:\n\
             1. Use `ask_database`: \"List all projects with their status and department\"\n\
             2. Use `ask_database`: \"Count projects by status\"\n\
             3. Call `department_report` for projects per department\n\
             4. Identify the departments with the highest project load\n\
             \n\
             OUTPUT:\n\
             - Project status summary\n\
             - Status distribution\n\
             - Department workload analysis\n\
             - Recommendations for resource allocation"
                .to_string(),
        )
    }

    #[prompt(
        name = "custom-query",
        title = "Custom Query",
        description = "Answer a plain-language question from the database"
    )]
    async fn custom_query_prompt(&self, params: Parameters<CustomQueryArgs>) -> Vec<PromptMessage> {
        info!(prompt = "custom-query", "Prompt requested");
        user_message(format!(
            "Answer a database question.\n\
             \n\
             QUESTION: {question}\n\
             \n\
             WORKFLOW:\n\
             1. Call `get_schema` if the tables involved are unclear\n\
             2. Call `ask_database` with the question\n\
             3. If SQL generation is unavailable, write a SELECT and run it with `execute_sql`\n\
             4. For more than 50 rows, use `paginated_query`\n\
             \n\
             OUTPUT:\n\
             - Direct answer to the question\n\
             - Supporting data in a table\n\
             - Any relevant insights",
            question = params.0.question.trim(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::static_state;
    use rmcp::model::PromptMessageContent;

    fn text(messages: &[PromptMessage]) -> &str {
        match &messages[0].content {
            PromptMessageContent::Text { text } => text.as_str(),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prompts_embed_arguments_and_tables() {
        let service = OrgSqlService::new(static_state().await);

        let messages = service
            .sql_query_builder_prompt(Parameters(SqlBuilderArgs {
                requirement: "  employees hired in 2023 ".to_string(),
            }))
            .await;
        let body = text(&messages);
        assert!(body.contains("REQUIREMENT: employees hired in 2023\n"));
        assert!(body.contains("department, role, employee, project"));

        let messages = service
            .custom_query_prompt(Parameters(CustomQueryArgs {
                question: "Who leads Sales?".to_string(),
            }))
            .await;
        assert!(text(&messages).contains("QUESTION: Who leads Sales?"));

        let messages = service.employee_report_prompt().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, PromptMessageRole::User);
        assert!(text(&messages).contains("`employee_report`"));
    }
}
