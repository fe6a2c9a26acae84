//! 設定ファイル Outbound ポート

use crate::domain::ConduitConfig;
use common::error::Error;
use std::path::PathBuf;

pub trait ConfigRepository: Send + Sync {
    /// 設定ファイルのパス
    fn path(&self) -> PathBuf;
    /// 読み込む。ファイルが無ければ Error::Config（`conduit config init` を案内）。
    fn load(&self) -> Result<ConduitConfig, Error>;
    /// 新規作成する。既に存在すれば上書きせずエラー。
    fn create(&self, config: &ConduitConfig) -> Result<PathBuf, Error>;
}
