//! エラーハンドリング
//!
//! 全レイヤー共通のエラー型。バリアントごとに終了コード（sysexits 準拠）を持つ。

/// 共通エラー型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// ファイル I/O 失敗（元のメッセージをそのまま保持する）
    #[error("{0}")]
    Io(String),
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    /// 環境変数の不足など
    #[error("{0}")]
    Env(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Http(String),
    #[error("JSON error: {0}")]
    Json(String),
    /// Jira / Confluence 側の失敗（接続・API エラー）
    #[error("{0}")]
    Platform(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// usage 行を併せて表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::NotFound(_) => 66,
            Self::Http(_) | Self::Platform(_) => 69,
            Self::Io(_) => 74,
            Self::Env(_) | Self::Config(_) => 78,
            Self::Json(_) | Self::System(_) => 70,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
