//! Jira 課題のユースケース
//!
//! 説明文・コメントはステージングファイルから読み、StagingUseCase で後始末する。
//! ファイル指定のコマンドでは接続もリモート処理の一部として扱い、
//! サイト解決や接続に失敗してもステージングファイルを退避する。

use crate::domain::{IssueKey, IssueUpdate, NewIssue};
use crate::ports::outbound::{IssueTracker, PlatformFactory};
use crate::usecase::staging::{StagedFailure, StagingUseCase};
use common::error::Error;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `jira issue create` の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueInput {
    pub project: String,
    pub summary: String,
    pub issue_type: String,
}

impl CreateIssueInput {
    fn into_issue(self, description: &str) -> NewIssue {
        NewIssue {
            project: self.project,
            summary: self.summary,
            description: description.to_string(),
            issue_type: self.issue_type,
        }
    }
}

pub struct IssueUseCase {
    factory: Arc<dyn PlatformFactory>,
    staging: Arc<StagingUseCase>,
}

impl IssueUseCase {
    pub fn new(factory: Arc<dyn PlatformFactory>, staging: Arc<StagingUseCase>) -> Self {
        Self { factory, staging }
    }

    fn tracker(&self, site: Option<&str>) -> Result<Arc<dyn IssueTracker>, Error> {
        let tracker = self.factory.issue_tracker(site)?;
        tracker.connect()?;
        Ok(tracker)
    }

    pub fn get(&self, site: Option<&str>, key: &IssueKey) -> Result<Value, Error> {
        self.tracker(site)?.get_issue(key)
    }

    pub fn search(&self, site: Option<&str>, jql: &str) -> Result<Vec<Value>, Error> {
        if jql.trim().is_empty() {
            return Err(Error::invalid_argument("JQL query must not be empty"));
        }
        self.tracker(site)?.search_issues(jql)
    }

    /// 説明文をファイルから読んで作成する
    pub fn create(
        &self,
        site: Option<&str>,
        input: CreateIssueInput,
        content_file: &Path,
    ) -> Result<Value, StagedFailure> {
        self.staging.run_with_content(content_file, |description| {
            self.tracker(site)?
                .create_issue(&input.into_issue(description))
        })
    }

    /// 説明文をステージングしてから作成する（MCP 用）
    pub fn create_with_text(
        &self,
        site: Option<&str>,
        input: CreateIssueInput,
        description: &str,
    ) -> Result<Value, StagedFailure> {
        let tracker = self.tracker(site)?;
        let path = self.staging.stage(description)?;
        self.staging.run_with_content(&path, |description| {
            tracker.create_issue(&input.into_issue(description))
        })
    }

    /// summary / 説明文ファイルの少なくとも一方が必要
    pub fn update(
        &self,
        site: Option<&str>,
        key: &IssueKey,
        summary: Option<String>,
        content_file: Option<&Path>,
    ) -> Result<(), StagedFailure> {
        if summary.is_none() && content_file.is_none() {
            return Err(Error::invalid_argument(
                "jira issue update requires --summary and/or --content-file",
            )
            .into());
        }
        match content_file {
            Some(path) => self.staging.run_with_content(path, |description| {
                self.tracker(site)?.update_issue(
                    key,
                    &IssueUpdate {
                        summary,
                        description: Some(description.to_string()),
                    },
                )
            }),
            None => Ok(self.tracker(site)?.update_issue(
                key,
                &IssueUpdate {
                    summary,
                    description: None,
                },
            )?),
        }
    }

    pub fn comment(
        &self,
        site: Option<&str>,
        key: &IssueKey,
        content_file: &Path,
    ) -> Result<Value, StagedFailure> {
        self.staging
            .run_with_content(content_file, |body| self.tracker(site)?.add_comment(key, body))
    }

    /// コメントをステージングしてから追加する（MCP 用）
    pub fn comment_with_text(
        &self,
        site: Option<&str>,
        key: &IssueKey,
        body: &str,
    ) -> Result<Value, StagedFailure> {
        let tracker = self.tracker(site)?;
        let path: PathBuf = self.staging.stage(body)?;
        self.staging
            .run_with_content(&path, |body| tracker.add_comment(key, body))
    }

    pub fn transition(&self, site: Option<&str>, key: &IssueKey, status: &str) -> Result<(), Error> {
        if status.trim().is_empty() {
            return Err(Error::invalid_argument("status must not be empty"));
        }
        self.tracker(site)?.transition_status(key, status)
    }

    pub fn transitions(&self, site: Option<&str>, key: &IssueKey) -> Result<Vec<Value>, Error> {
        self.tracker(site)?.get_transitions(key)
    }

    pub fn remote_links(&self, site: Option<&str>, key: &IssueKey) -> Result<Vec<Value>, Error> {
        self.tracker(site)?.get_remote_links(key)
    }
}
