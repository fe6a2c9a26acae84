//! Confluence ページのユースケース

use crate::adapter::confluence_markup::format_page_markdown;
use crate::ports::outbound::{PageStore, PlatformFactory};
use common::error::Error;
use serde_json::Value;
use std::sync::Arc;

/// 子ページ一覧の既定件数
pub const DEFAULT_CHILD_LIMIT: u32 = 100;

pub struct PageUseCase {
    factory: Arc<dyn PlatformFactory>,
}

impl PageUseCase {
    pub fn new(factory: Arc<dyn PlatformFactory>) -> Self {
        Self { factory }
    }

    fn store(&self, site: Option<&str>) -> Result<Arc<dyn PageStore>, Error> {
        let store = self.factory.page_store(site)?;
        store.connect()?;
        Ok(store)
    }

    pub fn list(&self, site: Option<&str>, space: &str, limit: u32) -> Result<Vec<Value>, Error> {
        self.store(site)?.get_pages_by_space(space, limit)
    }

    pub fn list_all(
        &self,
        site: Option<&str>,
        space: &str,
        batch_size: u32,
    ) -> Result<Vec<Value>, Error> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("--batch-size must be greater than 0"));
        }
        self.store(site)?.get_all_pages_by_space(space, batch_size)
    }

    pub fn children(&self, site: Option<&str>, parent_id: &str) -> Result<Vec<Value>, Error> {
        self.store(site)?
            .get_child_pages(parent_id, DEFAULT_CHILD_LIMIT)
    }

    /// タイトルで引いたページを Markdown にして返す
    pub fn content(&self, site: Option<&str>, space: &str, title: &str) -> Result<String, Error> {
        let page = self
            .store(site)?
            .get_page_by_title(space, title)?
            .ok_or_else(|| {
                Error::not_found(format!("Page '{}' not found in space {}", title, space))
            })?;
        Ok(format_page_markdown(&page))
    }
}
