//! MCP サーバーが公開するツール群
//!
//! いずれもユースケースへの薄い委譲。本文を伴うツールは CLI と同じくステージング経由で送る。

use crate::domain::{IssueKey, DEFAULT_ISSUE_TYPE};
use crate::usecase::{CreateIssueInput, IssueUseCase, PageUseCase, StagedFailure};
use common::error::Error;
use common::tool::{optional_str, required_str, Tool, ToolContext, ToolError, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;

/// 一覧ツールで取得するページ数
const LIST_PAGES_LIMIT: u32 = 100;

fn to_tool_error(e: Error) -> ToolError {
    if e.is_usage() {
        ToolError::InvalidArgs(e.to_string())
    } else {
        ToolError::ExecutionFailed(e.to_string())
    }
}

fn staged_to_tool_error(f: StagedFailure) -> ToolError {
    ToolError::ExecutionFailed(f.report())
}

fn issue_key(args: &Value) -> Result<IssueKey, ToolError> {
    IssueKey::parse(required_str(args, "key")?).map_err(to_tool_error)
}

fn site_alias_schema() -> Value {
    json!({ "type": "string", "description": "Site alias from the configuration (optional)" })
}

/// 設定済みサイト一覧（トークンは伏せる）
pub struct ListConfigTool {
    masked_config: Value,
}

impl ListConfigTool {
    pub const NAME: &'static str = "list_config";

    pub fn new(masked_config: Value) -> Self {
        Self { masked_config }
    }
}

impl Tool for ListConfigTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "List all configured Jira and Confluence sites"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn call(&self, _args: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
        Ok(self.masked_config.clone())
    }
}

pub struct ListConfluencePagesTool {
    pages: Arc<PageUseCase>,
}

impl ListConfluencePagesTool {
    pub const NAME: &'static str = "list_confluence_pages";

    pub fn new(pages: Arc<PageUseCase>) -> Self {
        Self { pages }
    }
}

impl Tool for ListConfluencePagesTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "List pages in a Confluence space"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "space_key": { "type": "string", "description": "Confluence space key" },
                "site_alias": site_alias_schema()
            },
            "required": ["space_key"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let space = required_str(&args, "space_key")?;
        let site = ctx.site_alias(&args);
        let pages = self
            .pages
            .list(site.as_deref(), space, LIST_PAGES_LIMIT)
            .map_err(to_tool_error)?;
        Ok(Value::Array(pages))
    }
}

pub struct GetConfluencePageTool {
    pages: Arc<PageUseCase>,
}

impl GetConfluencePageTool {
    pub const NAME: &'static str = "get_confluence_page";

    pub fn new(pages: Arc<PageUseCase>) -> Self {
        Self { pages }
    }
}

impl Tool for GetConfluencePageTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Get a Confluence page by title, rendered as Markdown"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "space_key": { "type": "string", "description": "Confluence space key" },
                "title": { "type": "string", "description": "Exact page title" },
                "site_alias": site_alias_schema()
            },
            "required": ["space_key", "title"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let space = required_str(&args, "space_key")?;
        let title = required_str(&args, "title")?;
        let site = ctx.site_alias(&args);
        let markdown = self
            .pages
            .content(site.as_deref(), space, title)
            .map_err(to_tool_error)?;
        Ok(Value::String(markdown))
    }
}

pub struct GetJiraIssueTool {
    issues: Arc<IssueUseCase>,
}

impl GetJiraIssueTool {
    pub const NAME: &'static str = "get_jira_issue";

    pub fn new(issues: Arc<IssueUseCase>) -> Self {
        Self { issues }
    }
}

impl Tool for GetJiraIssueTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Get a Jira issue by key (e.g. PROJ-123)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string", "description": "Issue key" },
                "site_alias": site_alias_schema()
            },
            "required": ["key"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let key = issue_key(&args)?;
        let site = ctx.site_alias(&args);
        self.issues.get(site.as_deref(), &key).map_err(to_tool_error)
    }
}

pub struct SearchJiraIssuesTool {
    issues: Arc<IssueUseCase>,
}

impl SearchJiraIssuesTool {
    pub const NAME: &'static str = "search_jira_issues";

    pub fn new(issues: Arc<IssueUseCase>) -> Self {
        Self { issues }
    }
}

impl Tool for SearchJiraIssuesTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Search Jira issues with a JQL query"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "jql": { "type": "string", "description": "JQL query" },
                "site_alias": site_alias_schema()
            },
            "required": ["jql"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let jql = required_str(&args, "jql")?;
        let site = ctx.site_alias(&args);
        let issues = self
            .issues
            .search(site.as_deref(), jql)
            .map_err(to_tool_error)?;
        Ok(Value::Array(issues))
    }
}

pub struct CreateJiraIssueTool {
    issues: Arc<IssueUseCase>,
}

impl CreateJiraIssueTool {
    pub const NAME: &'static str = "create_jira_issue";

    pub fn new(issues: Arc<IssueUseCase>) -> Self {
        Self { issues }
    }
}

impl Tool for CreateJiraIssueTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Create a Jira issue. The description is Markdown and is converted to Jira markup."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project": { "type": "string", "description": "Project key" },
                "summary": { "type": "string" },
                "description": { "type": "string", "description": "Markdown description" },
                "issue_type": { "type": "string", "description": "Issue type (default: Task)" },
                "site_alias": site_alias_schema()
            },
            "required": ["project", "summary", "description"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input = CreateIssueInput {
            project: required_str(&args, "project")?.to_string(),
            summary: required_str(&args, "summary")?.to_string(),
            issue_type: optional_str(&args, "issue_type")
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_ISSUE_TYPE)
                .to_string(),
        };
        let description = required_str(&args, "description")?;
        let site = ctx.site_alias(&args);
        self.issues
            .create_with_text(site.as_deref(), input, description)
            .map_err(staged_to_tool_error)
    }
}

pub struct AddJiraCommentTool {
    issues: Arc<IssueUseCase>,
}

impl AddJiraCommentTool {
    pub const NAME: &'static str = "add_jira_comment";

    pub fn new(issues: Arc<IssueUseCase>) -> Self {
        Self { issues }
    }
}

impl Tool for AddJiraCommentTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Add a Markdown comment to a Jira issue"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string", "description": "Issue key" },
                "comment": { "type": "string", "description": "Markdown comment body" },
                "site_alias": site_alias_schema()
            },
            "required": ["key", "comment"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let key = issue_key(&args)?;
        let comment = required_str(&args, "comment")?;
        let site = ctx.site_alias(&args);
        self.issues
            .comment_with_text(site.as_deref(), &key, comment)
            .map_err(staged_to_tool_error)
    }
}

/// 全ツールを登録したレジストリ
pub fn build_registry(
    masked_config: Value,
    issues: Arc<IssueUseCase>,
    pages: Arc<PageUseCase>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ListConfigTool::new(masked_config)));
    registry.register(Arc::new(ListConfluencePagesTool::new(Arc::clone(&pages))));
    registry.register(Arc::new(GetConfluencePageTool::new(pages)));
    registry.register(Arc::new(GetJiraIssueTool::new(Arc::clone(&issues))));
    registry.register(Arc::new(SearchJiraIssuesTool::new(Arc::clone(&issues))));
    registry.register(Arc::new(CreateJiraIssueTool::new(Arc::clone(&issues))));
    registry.register(Arc::new(AddJiraCommentTool::new(issues)));
    registry
}
