//! Jira 課題まわりのドメイン型

use common::error::Error;
use regex::Regex;
use std::sync::OnceLock;

/// 接続先プラットフォーム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformName {
    Jira,
    Confluence,
}

impl PlatformName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jira => "jira",
            Self::Confluence => "confluence",
        }
    }
}

impl std::fmt::Display for PlatformName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlatformName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jira" => Ok(Self::Jira),
            "confluence" => Ok(Self::Confluence),
            _ => Err(Error::invalid_argument(format!(
                "Platform '{}' is not registered (expected: jira, confluence)",
                s
            ))),
        }
    }
}

fn issue_key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*-[0-9]+$").expect("valid issue key regex"))
}

/// 課題キー（例: PROJ-123）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey(String);

impl IssueKey {
    /// 形式を検証して作る。前後の空白は除去する。
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if issue_key_pattern().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::invalid_argument(format!(
                "Invalid issue key '{}' (expected e.g. PROJ-123)",
                s
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for IssueKey {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for IssueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 既定の課題タイプ
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// 新規課題（description は Markdown のまま持ち、送信直前に Jira 記法へ変換する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub project: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
}

/// 課題更新。None のフィールドは送らない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none()
    }
}
