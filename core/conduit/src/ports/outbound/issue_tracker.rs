//! 課題管理（Jira）Outbound ポート
//!
//! 戻り値は REST API の JSON をそのまま返す。失敗は Error::Platform に統一する。

use crate::domain::{IssueKey, IssueUpdate, NewIssue};
use common::error::Error;
use serde_json::Value;

/// 課題管理システムのクライアント
///
/// connect 前の呼び出しは "Not connected to Jira" で失敗する。
pub trait IssueTracker: Send + Sync {
    /// セッションを確立する（確立済みなら何もしない）
    fn connect(&self) -> Result<(), Error>;
    fn get_issue(&self, key: &IssueKey) -> Result<Value, Error>;
    /// JQL 検索。該当なしは空配列。
    fn search_issues(&self, jql: &str) -> Result<Vec<Value>, Error>;
    fn create_issue(&self, issue: &NewIssue) -> Result<Value, Error>;
    /// 更新内容が空なら API を呼ばずに成功する
    fn update_issue(&self, key: &IssueKey, update: &IssueUpdate) -> Result<(), Error>;
    fn add_comment(&self, key: &IssueKey, body: &str) -> Result<Value, Error>;
    fn get_transitions(&self, key: &IssueKey) -> Result<Vec<Value>, Error>;
    /// 遷移先ステータス名（または遷移名）で遷移する
    fn transition_status(&self, key: &IssueKey, status: &str) -> Result<(), Error>;
    fn get_remote_links(&self, key: &IssueKey) -> Result<Vec<Value>, Error>;
}
