//! Inbound ポート: main（CLI 境界）がアプリを駆動するための trait

use crate::cli::Config;
use common::error::Error;

/// 解析済みの Config を受け取りコマンドを実行する。戻り値はプロセス終了コード。
pub trait UseCaseRunner {
    fn run(&self, config: Config) -> Result<i32, Error>;
}
