//! 設定ファイルのユースケース（init / list / path）

use crate::domain::ConduitConfig;
use crate::ports::outbound::ConfigRepository;
use common::error::Error;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ConfigUseCase {
    repository: Arc<dyn ConfigRepository>,
}

impl ConfigUseCase {
    pub fn new(repository: Arc<dyn ConfigRepository>) -> Self {
        Self { repository }
    }

    /// ひな形を書き出す。既にあれば上書きしない。
    pub fn init(&self) -> Result<PathBuf, Error> {
        self.repository.create(&ConduitConfig::template())
    }

    /// API トークンを伏せた設定
    pub fn list(&self) -> Result<Value, Error> {
        Ok(self.repository.load()?.masked())
    }

    pub fn path(&self) -> PathBuf {
        self.repository.path()
    }
}
