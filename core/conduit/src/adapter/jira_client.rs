//! Jira REST API v2 クライアント（IssueTracker の実装）

use crate::adapter::atlassian_session::AtlassianSession;
use crate::adapter::jira_markup::markdown_to_jira;
use crate::domain::{IssueKey, IssueUpdate, NewIssue, SiteConfig};
use crate::ports::outbound::IssueTracker;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub struct JiraClient {
    site: SiteConfig,
    session: Mutex<Option<Arc<AtlassianSession>>>,
    logger: Arc<dyn Log>,
}

impl JiraClient {
    pub fn new(site: SiteConfig, logger: Arc<dyn Log>) -> Self {
        Self {
            site,
            session: Mutex::new(None),
            logger,
        }
    }

    fn session(&self) -> Result<Arc<AtlassianSession>, Error> {
        let guard = self
            .session
            .lock()
            .map_err(|_| Error::system("Jira session lock poisoned"))?;
        guard
            .clone()
            .ok_or_else(|| Error::platform("Not connected to Jira"))
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[(&str, Value)]) {
        let mut record = LogRecord::new(level, message).layer("adapter").kind("platform");
        record = record.field("platform", "jira");
        for (k, v) in fields {
            record = record.field(k, v.clone());
        }
        let _ = self.logger.log(&record);
    }

    /// 失敗を "Failed to <action>: <cause>" に包んでログに残す
    fn fail(&self, action: &str, e: Error) -> Error {
        let msg = format!("Failed to {}: {}", action, e);
        self.log(LogLevel::Error, &msg, &[]);
        Error::platform(msg)
    }

    fn issue_path(key: &IssueKey) -> String {
        format!("/rest/api/2/issue/{}", key)
    }
}

impl IssueTracker for JiraClient {
    fn connect(&self) -> Result<(), Error> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| Error::system("Jira session lock poisoned"))?;
        if guard.is_some() {
            return Ok(());
        }
        let session = AtlassianSession::new(&self.site)
            .and_then(|s| s.get("/rest/api/2/myself", &[]).map(|_| s))
            .map_err(|e| {
                let msg = format!("Failed to connect to Jira: {}", e);
                self.log(LogLevel::Error, &msg, &[]);
                Error::platform(msg)
            })?;
        self.log(
            LogLevel::Info,
            "connected",
            &[("url", json!(session.base_url()))],
        );
        *guard = Some(Arc::new(session));
        Ok(())
    }

    fn get_issue(&self, key: &IssueKey) -> Result<Value, Error> {
        self.session()?
            .get(&Self::issue_path(key), &[])
            .map_err(|e| self.fail(&format!("get issue {}", key), e))
    }

    fn search_issues(&self, jql: &str) -> Result<Vec<Value>, Error> {
        let result = self
            .session()?
            .get("/rest/api/2/search", &[("jql", jql.to_string())])
            .map_err(|e| self.fail("search issues", e))?;
        let issues = result["issues"].as_array().cloned().unwrap_or_default();
        self.log(
            LogLevel::Debug,
            "search finished",
            &[("jql", json!(jql)), ("count", json!(issues.len()))],
        );
        Ok(issues)
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<Value, Error> {
        let body = json!({
            "fields": {
                "project": { "key": issue.project },
                "summary": issue.summary,
                "description": markdown_to_jira(&issue.description),
                "issuetype": { "name": issue.issue_type },
            }
        });
        let created = self
            .session()?
            .post("/rest/api/2/issue", &body)
            .map_err(|e| self.fail(&format!("create issue in {}", issue.project), e))?;
        self.log(
            LogLevel::Info,
            "issue created",
            &[("key", created["key"].clone())],
        );
        Ok(created)
    }

    fn update_issue(&self, key: &IssueKey, update: &IssueUpdate) -> Result<(), Error> {
        if update.is_empty() {
            return Ok(());
        }
        let mut fields = Map::new();
        if let Some(summary) = &update.summary {
            fields.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = &update.description {
            fields.insert(
                "description".to_string(),
                json!(markdown_to_jira(description)),
            );
        }
        self.session()?
            .put(&Self::issue_path(key), &json!({ "fields": fields }))
            .map_err(|e| self.fail(&format!("update issue {}", key), e))?;
        self.log(LogLevel::Info, "issue updated", &[("key", json!(key.as_str()))]);
        Ok(())
    }

    fn add_comment(&self, key: &IssueKey, body: &str) -> Result<Value, Error> {
        let path = format!("{}/comment", Self::issue_path(key));
        let comment = self
            .session()?
            .post(&path, &json!({ "body": markdown_to_jira(body) }))
            .map_err(|e| self.fail(&format!("add comment to issue {}", key), e))?;
        self.log(LogLevel::Info, "comment added", &[("key", json!(key.as_str()))]);
        Ok(comment)
    }

    fn get_transitions(&self, key: &IssueKey) -> Result<Vec<Value>, Error> {
        let path = format!("{}/transitions", Self::issue_path(key));
        let result = self
            .session()?
            .get(&path, &[])
            .map_err(|e| self.fail(&format!("get transitions for issue {}", key), e))?;
        Ok(result["transitions"].as_array().cloned().unwrap_or_default())
    }

    fn transition_status(&self, key: &IssueKey, status: &str) -> Result<(), Error> {
        let transitions = self.get_transitions(key)?;
        let Some(id) = find_transition_id(&transitions, status) else {
            let available: Vec<String> = transitions.iter().map(transition_label).collect();
            return Err(self.fail(
                &format!("transition issue {}", key),
                Error::platform(format!(
                    "No transition to '{}' (available: {})",
                    status,
                    if available.is_empty() {
                        "none".to_string()
                    } else {
                        available.join(", ")
                    }
                )),
            ));
        };
        let path = format!("{}/transitions", Self::issue_path(key));
        self.session()?
            .post(&path, &json!({ "transition": { "id": id } }))
            .map_err(|e| self.fail(&format!("transition issue {}", key), e))?;
        self.log(
            LogLevel::Info,
            "issue transitioned",
            &[("key", json!(key.as_str())), ("status", json!(status))],
        );
        Ok(())
    }

    fn get_remote_links(&self, key: &IssueKey) -> Result<Vec<Value>, Error> {
        let path = format!("{}/remotelink", Self::issue_path(key));
        let result = self
            .session()?
            .get(&path, &[])
            .map_err(|e| self.fail(&format!("get remote links for issue {}", key), e))?;
        Ok(result.as_array().cloned().unwrap_or_default())
    }
}

/// 遷移先ステータス名、次に遷移名で大文字小文字を無視して探す
pub(crate) fn find_transition_id(transitions: &[Value], status: &str) -> Option<String> {
    let wanted = status.trim().to_lowercase();
    let matches = |v: &Value| {
        v.as_str()
            .map(|s| s.to_lowercase() == wanted)
            .unwrap_or(false)
    };
    transitions
        .iter()
        .find(|t| matches(&t["to"]["name"]))
        .or_else(|| transitions.iter().find(|t| matches(&t["name"])))
        .and_then(|t| match &t["id"] {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// 一覧表示用（`id: name`）
pub fn transition_label(t: &Value) -> String {
    let id = match &t["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{}: {}", id, t["name"].as_str().unwrap_or_default())
}
