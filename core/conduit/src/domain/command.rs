//! conduit コマンドの enum（Command Pattern）
//!
//! CLI の解析結果をこの enum に落とし、main の Runner が match でディスパッチする。

use crate::domain::{IssueKey, PlatformName};
use std::path::PathBuf;

/// conduit の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum ConduitCommand {
    /// 接続確認
    Connect { platform: PlatformName },
    /// 新しいステージングパスを表示（ファイルは作らない）
    GetContentPath,
    Config(ConfigCommand),
    Jira(JiraCommand),
    Confluence(ConfluenceCommand),
    /// MCP サーバーを stdio で起動
    Mcp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// ひな形の config.json を作成（既存なら拒否）
    Init,
    /// トークンを伏せて一覧表示
    List,
    /// 設定ファイルのパスを表示
    Path,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JiraCommand {
    Get {
        key: IssueKey,
    },
    Search {
        jql: String,
    },
    Create {
        project: String,
        summary: String,
        content_file: PathBuf,
        issue_type: String,
    },
    Update {
        key: IssueKey,
        summary: Option<String>,
        content_file: Option<PathBuf>,
    },
    Comment {
        key: IssueKey,
        content_file: PathBuf,
    },
    Status {
        key: IssueKey,
        status: String,
    },
    Transitions {
        key: IssueKey,
    },
    RemoteLinks {
        key: IssueKey,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfluenceCommand {
    List { space: String, limit: u32 },
    ListAll { space: String, batch_size: u32 },
    Children { parent_id: String },
    Content { space: String, title: String },
}

impl ConduitCommand {
    /// ログ用のコマンド名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::GetContentPath => "get-content-path",
            Self::Config(ConfigCommand::Init) => "config init",
            Self::Config(ConfigCommand::List) => "config list",
            Self::Config(ConfigCommand::Path) => "config path",
            Self::Jira(JiraCommand::Get { .. }) => "jira issue get",
            Self::Jira(JiraCommand::Search { .. }) => "jira issue search",
            Self::Jira(JiraCommand::Create { .. }) => "jira issue create",
            Self::Jira(JiraCommand::Update { .. }) => "jira issue update",
            Self::Jira(JiraCommand::Comment { .. }) => "jira issue comment",
            Self::Jira(JiraCommand::Status { .. }) => "jira issue status",
            Self::Jira(JiraCommand::Transitions { .. }) => "jira issue transitions",
            Self::Jira(JiraCommand::RemoteLinks { .. }) => "jira issue remote-links",
            Self::Confluence(ConfluenceCommand::List { .. }) => "confluence pages list",
            Self::Confluence(ConfluenceCommand::ListAll { .. }) => "confluence pages list-all",
            Self::Confluence(ConfluenceCommand::Children { .. }) => "confluence pages children",
            Self::Confluence(ConfluenceCommand::Content { .. }) => "confluence pages content",
            Self::Mcp => "mcp",
        }
    }
}
