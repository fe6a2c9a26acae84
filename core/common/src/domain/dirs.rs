//! 実行時ディレクトリ（CONDUIT_HOME / XDG 解決結果）
//!
//! EnvResolver::resolve_dirs() で取得し、設定ファイル・ログ・ステージング先のパス計算に使う。

use std::path::PathBuf;

/// 設定ファイル名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// ステージングディレクトリの既定名（config_dir 直下）
pub const DEFAULT_CONTENT_DIR_NAME: &str = "content";

const LOG_FILE_NAME: &str = "conduit.jsonl";

/// 解決済みの config / state ディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl Dirs {
    pub fn new(config_dir: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            state_dir: state_dir.into(),
        }
    }

    /// 設定ファイル（config/config.json）
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// 設定で content_dir が指定されないときのステージングディレクトリ
    pub fn default_content_dir(&self) -> PathBuf {
        self.config_dir.join(DEFAULT_CONTENT_DIR_NAME)
    }

    /// ログ格納ディレクトリ（state/logs）
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }
}
