//! アダプター（Outbound ポートの実装と MCP サーバー）

pub mod atlassian_session;
pub mod confluence_client;
pub mod confluence_markup;
pub mod file_config_repository;
pub mod jira_client;
pub mod jira_markup;
pub mod mcp;
pub mod std_platform_factory;

pub use confluence_client::ConfluenceClient;
pub use file_config_repository::FileConfigRepository;
pub use jira_client::JiraClient;
pub use std_platform_factory::StdPlatformFactory;
