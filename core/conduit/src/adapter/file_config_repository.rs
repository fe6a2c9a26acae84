//! config.json をファイルシステム上で読み書きする ConfigRepository

use crate::domain::ConduitConfig;
use crate::ports::outbound::ConfigRepository;
use common::error::Error;
use common::ports::outbound::FileSystem;
use std::path::PathBuf;
use std::sync::Arc;

pub struct FileConfigRepository {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileConfigRepository {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }
}

impl ConfigRepository for FileConfigRepository {
    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn load(&self) -> Result<ConduitConfig, Error> {
        if !self.fs.exists(&self.path) {
            return Err(Error::config(format!(
                "Config file not found: {} (run `conduit config init`)",
                self.path.display()
            )));
        }
        let text = self.fs.read_to_string(&self.path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::config(format!("{}: {}", self.path.display(), e)))
    }

    fn create(&self, config: &ConduitConfig) -> Result<PathBuf, Error> {
        if self.fs.exists(&self.path) {
            return Err(Error::invalid_argument(format!(
                "Config file already exists: {}",
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut text = serde_json::to_string_pretty(config)?;
        text.push('\n');
        self.fs.write(&self.path, &text)?;
        Ok(self.path.clone())
    }
}
