//! 接続確認のユースケース

use crate::domain::PlatformName;
use crate::ports::outbound::PlatformFactory;
use common::error::Error;
use std::sync::Arc;

pub struct ConnectUseCase {
    factory: Arc<dyn PlatformFactory>,
}

impl ConnectUseCase {
    pub fn new(factory: Arc<dyn PlatformFactory>) -> Self {
        Self { factory }
    }

    pub fn run(&self, platform: PlatformName, site: Option<&str>) -> Result<(), Error> {
        match platform {
            PlatformName::Jira => self.factory.issue_tracker(site)?.connect(),
            PlatformName::Confluence => self.factory.page_store(site)?.connect(),
        }
    }
}
