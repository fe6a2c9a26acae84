//! conduit 共通ライブラリ
//!
//! CLI と MCP サーバーで共有される機能を提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype・ディレクトリ）
pub mod domain;

/// Outbound ポート（trait）
pub mod ports;

/// ポートの標準実装
pub mod adapter;

/// コンテンツのステージング（ContentManager）
pub mod content;

/// ステージングディレクトリ配下のパス検証
pub mod safe_content_path;

/// MCP ツールの抽象
pub mod tool;
