//! Confluence REST API クライアント（PageStore の実装）

use crate::adapter::atlassian_session::AtlassianSession;
use crate::domain::SiteConfig;
use crate::ports::outbound::PageStore;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const PAGE_EXPAND: &str = "version,body.storage";

pub struct ConfluenceClient {
    site: SiteConfig,
    session: Mutex<Option<Arc<AtlassianSession>>>,
    logger: Arc<dyn Log>,
}

impl ConfluenceClient {
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
            .map_err(|_| Error::system("Confluence session lock poisoned"))?;
        guard
            .clone()
            .ok_or_else(|| Error::platform("Not connected to Confluence"))
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[(&str, Value)]) {
        let mut record = LogRecord::new(level, message)
            .layer("adapter")
            .kind("platform")
            .field("platform", "confluence");
        for (k, v) in fields {
            record = record.field(k, v.clone());
        }
        let _ = self.logger.log(&record);
    }

    fn fail(&self, action: &str, e: Error) -> Error {
        let msg = format!("Failed to {}: {}", action, e);
        self.log(LogLevel::Error, &msg, &[]);
        Error::platform(msg)
    }

    /// スペース内ページの 1 バッチ
    fn fetch_space_batch(&self, space_key: &str, start: u32, limit: u32) -> Result<Vec<Value>, Error> {
        let query = [
            ("spaceKey", space_key.to_string()),
            ("type", "page".to_string()),
            ("start", start.to_string()),
            ("limit", limit.to_string()),
            ("expand", PAGE_EXPAND.to_string()),
        ];
        let result = self
            .session()?
            .get("/rest/api/content", &query)
            .map_err(|e| self.fail(&format!("get pages from space {}", space_key), e))?;
        Ok(results_of(&result))
    }
}

impl PageStore for ConfluenceClient {
    fn connect(&self) -> Result<(), Error> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| Error::system("Confluence session lock poisoned"))?;
        if guard.is_some() {
            return Ok(());
        }
        let session = AtlassianSession::new(&self.site)
            .and_then(|s| s.get("/rest/api/user/current", &[]).map(|_| s))
            .map_err(|e| {
                let msg = format!("Failed to connect to Confluence: {}", e);
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

    fn get_pages_by_space(&self, space_key: &str, limit: u32) -> Result<Vec<Value>, Error> {
        self.fetch_space_batch(space_key, 0, limit)
    }

    fn get_all_pages_by_space(&self, space_key: &str, batch_size: u32) -> Result<Vec<Value>, Error> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch size must be greater than 0"));
        }
        let mut pages = Vec::new();
        let mut start = 0u32;
        loop {
            let batch = self.fetch_space_batch(space_key, start, batch_size)?;
            let fetched = batch.len();
            pages.extend(batch);
            if fetched < batch_size as usize {
                break;
            }
            start += batch_size;
        }
        self.log(
            LogLevel::Debug,
            "space listed",
            &[("space", json!(space_key)), ("count", json!(pages.len()))],
        );
        Ok(pages)
    }

    fn get_child_pages(&self, parent_id: &str, limit: u32) -> Result<Vec<Value>, Error> {
        let path = format!("/rest/api/content/{}/child/page", parent_id);
        let query = [
            ("limit", limit.to_string()),
            ("expand", PAGE_EXPAND.to_string()),
        ];
        let result = self
            .session()?
            .get(&path, &query)
            .map_err(|e| self.fail(&format!("get child pages of {}", parent_id), e))?;
        Ok(results_of(&result))
    }

    fn get_page_by_title(&self, space_key: &str, title: &str) -> Result<Option<Value>, Error> {
        let query = [
            ("spaceKey", space_key.to_string()),
            ("title", title.to_string()),
            ("type", "page".to_string()),
            ("expand", PAGE_EXPAND.to_string()),
        ];
        let result = self
            .session()?
            .get("/rest/api/content", &query)
            .map_err(|e| self.fail(&format!("get page '{}' from space {}", title, space_key), e))?;
        Ok(results_of(&result).into_iter().next())
    }
}

fn results_of(v: &Value) -> Vec<Value> {
    v["results"].as_array().cloned().unwrap_or_default()
}
