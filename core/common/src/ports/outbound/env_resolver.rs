//! 環境変数解決 Outbound ポート
//!
//! 設定・状態ディレクトリを環境変数から解決する。
//! usecase はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::Dirs;
use crate::error::Error;
use std::path::PathBuf;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// config / state ディレクトリを解決する
    ///
    /// 優先順位:
    /// 1. CONDUIT_HOME（config = $CONDUIT_HOME、state = $CONDUIT_HOME/state）
    /// 2. $XDG_CONFIG_HOME/conduit、$XDG_STATE_HOME/conduit
    /// 3. $HOME/.config/conduit、$HOME/.local/state/conduit
    fn resolve_dirs(&self) -> Result<Dirs, Error>;

    /// カレントディレクトリ（相対パスの絶対化に使う）
    fn current_dir(&self) -> Result<PathBuf, Error>;
}
