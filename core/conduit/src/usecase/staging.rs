//! ステージングファイル経由でリモート処理を行い、結果に応じて後始末するユースケース
//!
//! 成功: ステージングディレクトリ配下のファイルなら削除する。
//! 失敗: 配下のファイルなら failed_content/ へ退避し、退避先を利用者に伝える。
//! 配下にないファイル（利用者が任意の場所に置いたもの）は読むだけで触らない。

use common::content::ContentManager;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 失敗時にステージングファイルをどう扱ったか
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDisposal {
    /// 配下にない、または読み込み前に失敗したので触っていない
    Untouched,
    Archived(PathBuf),
    /// 退避そのものに失敗した（元のエラーとは別に報告する）
    ArchiveFailed(Error),
}

/// ステージング付き処理の失敗（元のエラー + 後始末の結果）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct StagedFailure {
    pub error: Error,
    pub disposal: FailureDisposal,
}

impl StagedFailure {
    /// エラー本文とは別に利用者へ伝える行
    pub fn notices(&self) -> Vec<String> {
        match &self.disposal {
            FailureDisposal::Untouched => Vec::new(),
            FailureDisposal::Archived(path) => {
                vec![format!("Content preserved at {}", path.display())]
            }
            FailureDisposal::ArchiveFailed(e) => {
                vec![format!("Failed to preserve content: {}", e)]
            }
        }
    }

    /// エラー本文と notices を改行で連結（MCP のツール結果用）
    pub fn report(&self) -> String {
        let mut lines = vec![self.error.to_string()];
        lines.extend(self.notices());
        lines.join("\n")
    }
}

impl From<Error> for StagedFailure {
    fn from(error: Error) -> Self {
        Self {
            error,
            disposal: FailureDisposal::Untouched,
        }
    }
}

impl From<StagedFailure> for Error {
    fn from(f: StagedFailure) -> Self {
        f.error
    }
}

pub struct StagingUseCase {
    content: Arc<ContentManager>,
    logger: Arc<dyn Log>,
}

impl StagingUseCase {
    pub fn new(content: Arc<ContentManager>, logger: Arc<dyn Log>) -> Self {
        Self { content, logger }
    }

    #[cfg(test)]
    pub fn content_manager(&self) -> &ContentManager {
        &self.content
    }

    /// 新しいステージングパス（`get-content-path`）
    pub fn content_path(&self) -> PathBuf {
        self.content.generate_content_path()
    }

    /// テキストを新しいステージングファイルに書き、そのパスを返す
    pub fn stage(&self, text: &str) -> Result<PathBuf, Error> {
        let path = self.content.generate_content_path();
        self.content.write_content(&path, text)?;
        self.log(LogLevel::Debug, "content staged", &path);
        Ok(path)
    }

    /// `path` の内容を読み、`remote` に渡して実行し、結果に応じて後始末する
    pub fn run_with_content<T, F>(&self, path: &Path, remote: F) -> Result<T, StagedFailure>
    where
        F: FnOnce(&str) -> Result<T, Error>,
    {
        let text = self.content.read_content(path).map_err(Error::from)?;
        let staged = self.content.contains(path);

        match remote(&text) {
            Ok(value) => {
                if staged {
                    match self.content.cleanup_content_file(path) {
                        Ok(()) => self.log(LogLevel::Debug, "content cleaned up", path),
                        Err(e) => {
                            // リモート側は成功しているので失敗扱いにはしない
                            let _ = self.logger.log(
                                &LogRecord::new(LogLevel::Warn, "content cleanup failed")
                                    .layer("usecase")
                                    .kind("content")
                                    .field("path", path.display().to_string())
                                    .field("error", e.to_string()),
                            );
                        }
                    }
                }
                Ok(value)
            }
            Err(error) => {
                let disposal = if staged {
                    self.archive(path)
                } else {
                    FailureDisposal::Untouched
                };
                Err(StagedFailure { error, disposal })
            }
        }
    }

    fn archive(&self, path: &Path) -> FailureDisposal {
        match self.content.mark_content_as_failed(path) {
            Ok(archived) => {
                self.log(LogLevel::Warn, "content archived", &archived);
                FailureDisposal::Archived(archived)
            }
            Err(e) => {
                let e = Error::from(e);
                let _ = self.logger.log(
                    &LogRecord::new(LogLevel::Error, "content archive failed")
                        .layer("usecase")
                        .kind("content")
                        .field("path", path.display().to_string())
                        .field("error", e.to_string()),
                );
                FailureDisposal::ArchiveFailed(e)
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str, path: &Path) {
        let _ = self.logger.log(
            &LogRecord::new(level, message)
                .layer("usecase")
                .kind("content")
                .field("path", path.display().to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::{NoopLog, StdClock, StdFileSystem, StdIdGenerator};

    fn staging_in(root: &Path) -> StagingUseCase {
        let manager = ContentManager::new(
            Arc::new(StdFileSystem),
            Arc::new(StdIdGenerator::new(Arc::new(StdClock))),
            root.join("content"),
        )
        .unwrap();
        StagingUseCase::new(Arc::new(manager), Arc::new(NoopLog))
    }

    #[test]
    fn test_success_cleans_up_staged_file() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = staging_in(tmp.path());
        let path = staging.stage("body").unwrap();

        let out = staging
            .run_with_content(&path, |text| Ok(text.to_uppercase()))
            .unwrap();
        assert_eq!(out, "BODY");
        assert!(!path.exists());
    }

    #[test]
    fn test_failure_archives_staged_file() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = staging_in(tmp.path());
        let path = staging.stage("keep me").unwrap();

        let failure = staging
            .run_with_content(&path, |_| -> Result<(), Error> {
                Err(Error::platform("HTTP 500: boom"))
            })
            .unwrap_err();

        assert_eq!(failure.error, Error::platform("HTTP 500: boom"));
        let FailureDisposal::Archived(archived) = &failure.disposal else {
            panic!("expected archived, got {:?}", failure.disposal);
        };
        assert!(!path.exists());
        assert_eq!(archived.parent(), Some(staging.content_manager().failed_content_dir()));
        assert_eq!(std::fs::read_to_string(archived).unwrap(), "keep me");
        assert_eq!(
            failure.notices(),
            vec![format!("Content preserved at {}", archived.display())]
        );
        assert!(failure.report().starts_with("HTTP 500: boom\nContent preserved at "));
    }

    #[test]
    fn test_file_outside_staging_is_never_touched() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = staging_in(tmp.path());
        let outside = tmp.path().join("notes.md");
        std::fs::write(&outside, "mine").unwrap();

        let ok = staging.run_with_content(&outside, |t| Ok(t.len())).unwrap();
        assert_eq!(ok, 4);
        assert!(outside.exists());

        let failure = staging
            .run_with_content(&outside, |_| -> Result<(), Error> {
                Err(Error::platform("nope"))
            })
            .unwrap_err();
        assert_eq!(failure.disposal, FailureDisposal::Untouched);
        assert!(failure.notices().is_empty());
        assert_eq!(std::fs::read_to_string(&outside).unwrap(), "mine");
    }

    #[test]
    fn test_missing_file_fails_before_remote_call() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = staging_in(tmp.path());
        let path = staging.content_path();
        let mut called = false;

        let failure = staging
            .run_with_content(&path, |_| {
                called = true;
                Ok(())
            })
            .unwrap_err();
        assert!(!called);
        assert_eq!(failure.error.exit_code(), 66);
        assert_eq!(failure.disposal, FailureDisposal::Untouched);
    }

    #[test]
    fn test_archive_failure_is_reported_separately() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = staging_in(tmp.path());
        let path = staging.stage("x").unwrap();

        // リモート処理中にファイルが消えた場合、退避は NotFound で失敗する
        let failure = staging
            .run_with_content(&path, |_| -> Result<(), Error> {
                std::fs::remove_file(&path).unwrap();
                Err(Error::platform("remote failed"))
            })
            .unwrap_err();

        assert_eq!(failure.error.to_string(), "remote failed");
        let FailureDisposal::ArchiveFailed(e) = &failure.disposal else {
            panic!("expected archive failure, got {:?}", failure.disposal);
        };
        assert!(e.to_string().contains("Content file not found"));
        let report = failure.report();
        assert!(report.starts_with("remote failed\n"));
        assert!(report.contains("Failed to preserve content: Content file not found"));
    }
}
