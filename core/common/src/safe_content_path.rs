//! ステージングディレクトリ配下のパス検証（パストラバーサル対策）
//!
//! ファイルが未作成でも判定できるよう、canonicalize ではなく字句的に `.` / `..` を解決してから
//! 前方一致（成分単位）で比較する。

use std::path::{Component, Path, PathBuf};

/// `.` を除去し `..` で直前の成分を取り除く（ファイルシステムには触れない）。
/// ルートより上へ出る `..` は捨てる。
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !path.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(s) => out.push(s),
        }
    }
    out
}

/// `base` を起点に絶対化し、字句的に正規化する
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// 正規化済みの `dir` に対し、`path`（正規化済み）がその配下か。`dir` 自身は配下に含めない。
pub fn is_within(dir: &Path, path: &Path) -> bool {
    path != dir && path.starts_with(dir)
}
