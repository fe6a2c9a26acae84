//! テスト用スタブ（ネットワークに出ない IssueTracker / PageStore / PlatformFactory）

use crate::domain::{ConduitConfig, IssueKey, IssueUpdate, NewIssue};
use crate::ports::outbound::{IssueTracker, PageStore, PlatformFactory};
use crate::wiring::Services;
use common::adapter::{NoopLog, StdClock, StdFileSystem, StdIdGenerator};
use common::content::ContentManager;
use common::error::Error;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// 呼び出しを記録する課題トラッカー。`fail_writes` で作成・更新・コメントを、
/// `fail_connect` で接続を失敗させる。
#[derive(Default)]
pub struct StubTracker {
    pub calls: Mutex<Vec<String>>,
    pub created: Mutex<Vec<NewIssue>>,
    pub updates: Mutex<Vec<IssueUpdate>>,
    pub comments: Mutex<Vec<String>>,
    pub fail_writes: AtomicBool,
    pub fail_connect: AtomicBool,
}

impl StubTracker {
    pub fn failing() -> Self {
        let t = Self::default();
        t.fail_writes.store(true, Ordering::SeqCst);
        t
    }

    pub fn offline() -> Self {
        let t = Self::default();
        t.fail_connect.store(true, Ordering::SeqCst);
        t
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(Error::platform("HTTP 400: summary: required"))
        } else {
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl IssueTracker for StubTracker {
    fn connect(&self) -> Result<(), Error> {
        self.record("connect".to_string());
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(Error::platform("Failed to connect to Jira: HTTP 401: Unauthorized"));
        }
        Ok(())
    }

    fn get_issue(&self, key: &IssueKey) -> Result<Value, Error> {
        self.record(format!("get {}", key));
        Ok(json!({ "key": key.as_str(), "fields": { "summary": "stub" } }))
    }

    fn search_issues(&self, jql: &str) -> Result<Vec<Value>, Error> {
        self.record(format!("search {}", jql));
        Ok(vec![json!({ "key": "ABC-1" }), json!({ "key": "ABC-2" })])
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<Value, Error> {
        self.record(format!("create {}", issue.project));
        self.write_result()?;
        self.created.lock().unwrap().push(issue.clone());
        Ok(json!({ "key": format!("{}-1", issue.project) }))
    }

    fn update_issue(&self, key: &IssueKey, update: &IssueUpdate) -> Result<(), Error> {
        self.record(format!("update {}", key));
        self.write_result()?;
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    fn add_comment(&self, key: &IssueKey, body: &str) -> Result<Value, Error> {
        self.record(format!("comment {}", key));
        self.write_result()?;
        self.comments.lock().unwrap().push(body.to_string());
        Ok(json!({ "id": "10001" }))
    }

    fn get_transitions(&self, key: &IssueKey) -> Result<Vec<Value>, Error> {
        self.record(format!("transitions {}", key));
        Ok(vec![json!({ "id": "31", "name": "Done", "to": { "name": "Closed" } })])
    }

    fn transition_status(&self, key: &IssueKey, status: &str) -> Result<(), Error> {
        self.record(format!("transition {} {}", key, status));
        Ok(())
    }

    fn get_remote_links(&self, key: &IssueKey) -> Result<Vec<Value>, Error> {
        self.record(format!("remote-links {}", key));
        Ok(Vec::new())
    }
}

/// 固定のページ群を返すページストア
pub struct StubPageStore {
    pub pages: Vec<Value>,
}

impl StubPageStore {
    pub fn with_pages() -> Self {
        Self {
            pages: vec![
                json!({
                    "id": "100",
                    "title": "Home",
                    "version": { "number": 2, "when": "2024-05-01T10:00:00Z" },
                    "body": { "storage": { "value": "<h1>Welcome</h1><p>Start <strong>here</strong>.</p>" } }
                }),
                json!({
                    "id": "101",
                    "title": "Release Notes",
                    "version": { "number": 1, "when": "2024-05-02T10:00:00Z" },
                    "body": { "storage": { "value": "<p>v1</p>" } }
                }),
            ],
        }
    }
}

impl PageStore for StubPageStore {
    fn connect(&self) -> Result<(), Error> {
        Ok(())
    }

    fn get_pages_by_space(&self, _space_key: &str, limit: u32) -> Result<Vec<Value>, Error> {
        Ok(self.pages.iter().take(limit as usize).cloned().collect())
    }

    fn get_all_pages_by_space(&self, _space_key: &str, _batch_size: u32) -> Result<Vec<Value>, Error> {
        Ok(self.pages.clone())
    }

    fn get_child_pages(&self, _parent_id: &str, _limit: u32) -> Result<Vec<Value>, Error> {
        Ok(Vec::new())
    }

    fn get_page_by_title(&self, _space_key: &str, title: &str) -> Result<Option<Value>, Error> {
        Ok(self.pages.iter().find(|p| p["title"] == title).cloned())
    }
}

/// サイト "work"（既定）だけを知っているファクトリ
pub struct StubFactory {
    pub tracker: Arc<StubTracker>,
    pub store: Arc<StubPageStore>,
    pub sites: Mutex<Vec<Option<String>>>,
}

impl StubFactory {
    pub fn new(tracker: StubTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
            store: Arc::new(StubPageStore::with_pages()),
            sites: Mutex::new(Vec::new()),
        }
    }

    fn check_site(&self, site: Option<&str>) -> Result<(), Error> {
        self.sites.lock().unwrap().push(site.map(str::to_string));
        match site {
            None | Some("work") => Ok(()),
            Some(other) => Err(Error::config(format!("Site '{}' not found in configuration", other))),
        }
    }
}

impl PlatformFactory for StubFactory {
    fn issue_tracker(&self, site: Option<&str>) -> Result<Arc<dyn IssueTracker>, Error> {
        self.check_site(site)?;
        Ok(Arc::clone(&self.tracker) as Arc<dyn IssueTracker>)
    }

    fn page_store(&self, site: Option<&str>) -> Result<Arc<dyn PageStore>, Error> {
        self.check_site(site)?;
        Ok(Arc::clone(&self.store) as Arc<dyn PageStore>)
    }
}

/// `root/content` をステージングにした Services
pub fn services_in(root: &Path, factory: Arc<StubFactory>) -> Services {
    let content = ContentManager::new(
        Arc::new(StdFileSystem),
        Arc::new(StdIdGenerator::new(Arc::new(StdClock))),
        root.join("content"),
    )
    .unwrap();
    Services::new(
        ConduitConfig::template(),
        factory as Arc<dyn PlatformFactory>,
        content,
        Arc::new(NoopLog),
    )
}

/// ステージングディレクトリ直下の .md ファイル数
pub fn staged_files(root: &Path) -> usize {
    count_md(&root.join("content"))
}

/// failed_content/ 内の .md ファイル
pub fn failed_files(root: &Path) -> Vec<std::path::PathBuf> {
    let dir = root.join("content").join("failed_content");
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().map_or(false, |e| e == "md"))
        .collect();
    files.sort();
    files
}

fn count_md(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            let p = e.as_ref().unwrap().path();
            p.is_file() && p.extension().map_or(false, |e| e == "md")
        })
        .count()
}
