//! PlatformFactory の標準実装: 設定のサイトから Jira / Confluence クライアントを作る

use crate::adapter::{ConfluenceClient, JiraClient};
use crate::domain::{ConduitConfig, PlatformName, SiteConfig};
use crate::ports::outbound::{IssueTracker, PageStore, PlatformFactory};
use common::error::Error;
use common::ports::outbound::Log;
use std::sync::Arc;

pub struct StdPlatformFactory {
    config: ConduitConfig,
    logger: Arc<dyn Log>,
}

impl StdPlatformFactory {
    pub fn new(config: ConduitConfig, logger: Arc<dyn Log>) -> Self {
        Self { config, logger }
    }

    fn site(&self, platform: PlatformName, alias: Option<&str>) -> Result<SiteConfig, Error> {
        Ok(self.config.platform(platform).get_site_config(alias)?.clone())
    }
}

impl PlatformFactory for StdPlatformFactory {
    fn issue_tracker(&self, site: Option<&str>) -> Result<Arc<dyn IssueTracker>, Error> {
        let site = self.site(PlatformName::Jira, site)?;
        Ok(Arc::new(JiraClient::new(site, Arc::clone(&self.logger))))
    }

    fn page_store(&self, site: Option<&str>) -> Result<Arc<dyn PageStore>, Error> {
        let site = self.site(PlatformName::Confluence, site)?;
        Ok(Arc::new(ConfluenceClient::new(site, Arc::clone(&self.logger))))
    }
}
