//! コンテンツのステージング（ContentManager）
//!
//! 説明文・コメント等の長文をシェルエスケープなしでコマンドへ渡すため、
//! ステージングディレクトリ配下の `.md` ファイル経由で受け渡す。
//!
//! ファイルのライフサイクル:
//! `generate_content_path`（パスのみ）→ `write_content` → 成功時 `cleanup_content_file`（削除）
//! / 失敗時 `mark_content_as_failed`（`failed_content/` へ移動して保全）。
//!
//! 書き込み・削除・移動は必ずステージングディレクトリ配下のパスに限る（FS を触る前に検査）。
//! 読み込みは配下以外も許可する（エディタで作った任意のファイルを `--content-file` で渡せる）。
//! ログもリトライも行わない。後始末の判断は呼び出し側（usecase）が持つ。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, IdGenerator};
use crate::safe_content_path::{absolutize, is_within, normalize_lexically};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ステージングファイルの拡張子（内容の形式とは無関係な慣習）
pub const CONTENT_FILE_EXTENSION: &str = "md";

/// 失敗したコンテンツの退避先（content_dir 直下のサブディレクトリ名）
pub const FAILED_CONTENT_DIR_NAME: &str = "failed_content";

const CONTENT_FILE_PREFIX: &str = "content_";

/// ContentManager の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// ステージングディレクトリ外のパスに対する変更操作
    #[error("File path must be within content directory: {}", path.display())]
    Containment { path: PathBuf },
    #[error("Content file not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// 下位のファイルシステムエラー（そのまま伝播）
    #[error(transparent)]
    Io(#[from] Error),
}

impl From<ContentError> for Error {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Containment { .. } => Error::invalid_argument(e.to_string()),
            ContentError::NotFound { .. } => Error::not_found(e.to_string()),
            ContentError::Io(inner) => inner,
        }
    }
}

/// ステージングディレクトリと失敗退避ディレクトリを所有する
pub struct ContentManager {
    fs: Arc<dyn FileSystem>,
    id_gen: Arc<dyn IdGenerator>,
    content_dir: PathBuf,
    failed_content_dir: PathBuf,
}

impl ContentManager {
    /// `content_dir`（相対ならカレントディレクトリ基準）と `content_dir/failed_content` を
    /// 必要なら作成して manager を返す。既に存在してもエラーにしない。
    pub fn new(
        fs: Arc<dyn FileSystem>,
        id_gen: Arc<dyn IdGenerator>,
        content_dir: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        let content_dir = to_absolute(content_dir.as_ref())?;
        let failed_content_dir = content_dir.join(FAILED_CONTENT_DIR_NAME);
        fs.create_dir_all(&content_dir)?;
        fs.create_dir_all(&failed_content_dir)?;
        Ok(Self {
            fs,
            id_gen,
            content_dir,
            failed_content_dir,
        })
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn failed_content_dir(&self) -> &Path {
        &self.failed_content_dir
    }

    /// `path` が（絶対化・正規化後に）ステージングディレクトリ配下か
    pub fn contains(&self, path: &Path) -> bool {
        match to_absolute(path) {
            Ok(p) => is_within(&self.content_dir, &p),
            Err(_) => false,
        }
    }

    /// 未使用のステージングパスを返す（ファイルは作らない）。
    ///
    /// ファイル名は `content_<ContentId>_<pid>.md`。ContentId はプロセス内で単調増加、
    /// pid で同じディレクトリを共有する別プロセスとも衝突しない。念のため既存ファイルは避ける。
    pub fn generate_content_path(&self) -> PathBuf {
        let pid = std::process::id();
        loop {
            let id = self.id_gen.next_id();
            let file_name = format!(
                "{}{}_{:x}.{}",
                CONTENT_FILE_PREFIX, id, pid, CONTENT_FILE_EXTENSION
            );
            let path = self.content_dir.join(&file_name);
            if !self.fs.exists(&path) && !self.fs.exists(&self.failed_content_dir.join(&file_name)) {
                return path;
            }
        }
    }

    /// `content` を UTF-8 で書き込む（作成または上書き）
    pub fn write_content(&self, path: &Path, content: &str) -> Result<(), ContentError> {
        let path = self.checked_path(path)?;
        self.fs.write(&path, content)?;
        Ok(())
    }

    /// ファイル全体を文字列で返す。配下チェックはしない。
    pub fn read_content(&self, path: &Path) -> Result<String, ContentError> {
        if !self.fs.exists(path) {
            return Err(ContentError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(self.fs.read_to_string(path)?)
    }

    /// 成功時の後始末: ファイルを削除する。既に無ければ何もしない。
    pub fn cleanup_content_file(&self, path: &Path) -> Result<(), ContentError> {
        let path = self.checked_path(path)?;
        if self.fs.exists(&path) {
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }

    /// 失敗時の保全: ファイル名を保ったまま `failed_content/` へ移動し、移動先を返す
    pub fn mark_content_as_failed(&self, path: &Path) -> Result<PathBuf, ContentError> {
        let path = self.checked_path(path)?;
        if !self.fs.exists(&path) {
            return Err(ContentError::NotFound { path });
        }
        // 配下チェック済みなので file_name は必ずある
        let file_name = path
            .file_name()
            .ok_or_else(|| ContentError::Containment { path: path.clone() })?;
        let failed_path = self.failed_content_dir.join(file_name);
        self.fs.rename(&path, &failed_path)?;
        Ok(failed_path)
    }

    fn checked_path(&self, path: &Path) -> Result<PathBuf, ContentError> {
        let abs = to_absolute(path)?;
        if !is_within(&self.content_dir, &abs) {
            return Err(ContentError::Containment {
                path: path.to_path_buf(),
            });
        }
        Ok(abs)
    }
}

fn to_absolute(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        return Ok(normalize_lexically(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::io_msg(format!("Failed to get current directory: {}", e)))?;
    Ok(absolutize(&cwd, path))
}
