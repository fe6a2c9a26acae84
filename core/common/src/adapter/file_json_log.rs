//! Log 実装（ファイルへ JSONL 追記 / stderr / 合成 / 何もしない）
//!
//! 通常ログの出力先はファイルのみ。-v 指定時だけ StderrLog を TeeLog で重ねる。
//! MCP サーバー実行中は stdout がプロトコル用のため、どの実装も stdout には書かない。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogRecord};
use std::path::Path;
use std::sync::Arc;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: std::path::PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(record)?;
        use std::io::Write;
        w.write_all(line.as_bytes())
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.write_all(b"\n")
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.flush().map_err(|e| Error::io_msg(e.to_string()))?;
        Ok(())
    }
}

/// レコードを 1 行に整形して stderr へ出す Log 実装（-v/--verbose 用）
#[derive(Debug, Clone, Default)]
pub struct StderrLog;

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let level = serde_json::to_value(record.level)?;
        let mut line = format!(
            "[{}] {}",
            level.as_str().unwrap_or("info"),
            record.message
        );
        if let Some(fields) = &record.fields {
            for (k, v) in fields {
                line.push_str(&format!(" {}={}", k, v));
            }
        }
        eprintln!("{}", line);
        Ok(())
    }
}

/// 複数の Log へ同じレコードを流す。1 つが失敗しても残りには書き、最初のエラーを返す。
pub struct TeeLog {
    logs: Vec<Arc<dyn Log>>,
}

impl TeeLog {
    pub fn new(logs: Vec<Arc<dyn Log>>) -> Self {
        Self { logs }
    }
}

impl Log for TeeLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for log in &self.logs {
            if let Err(e) = log.log(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// 何も出力しない Log 実装（テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{now_iso8601, LogLevel};

    #[test]
    fn test_noop_log() {
        let log = NoopLog;
        let rec = LogRecord {
            ts: now_iso8601(),
            level: LogLevel::Info,
            message: "test".to_string(),
            layer: None,
            kind: None,
            fields: None,
        };
        assert!(log.log(&rec).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("conduit.jsonl");
        let log = FileJsonLog::new(Arc::new(crate::adapter::StdFileSystem), &path);

        log.log(&LogRecord::new(LogLevel::Info, "command started").layer("cli"))
            .unwrap();
        log.log(&LogRecord::new(LogLevel::Error, "boom").kind("error"))
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], "command started");
        assert_eq!(first["layer"], "cli");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "error");
    }

    struct FailingLog;

    impl Log for FailingLog {
        fn log(&self, _record: &LogRecord) -> Result<(), Error> {
            Err(Error::io_msg("disk full"))
        }
    }

    #[test]
    fn test_tee_log_writes_all_and_reports_first_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tee.jsonl");
        let file_log: Arc<dyn Log> =
            Arc::new(FileJsonLog::new(Arc::new(crate::adapter::StdFileSystem), &path));
        let tee = TeeLog::new(vec![Arc::new(FailingLog), file_log]);

        let err = tee.log(&LogRecord::new(LogLevel::Info, "x")).unwrap_err();
        assert_eq!(err, Error::io_msg("disk full"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"message\":\"x\""));
    }
}
