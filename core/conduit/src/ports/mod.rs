//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI / MCP サーバー）がアプリを呼び出すインターフェース
//! - outbound: Jira / Confluence / 設定ファイル等、アプリが外界に依頼するための trait

pub mod inbound;
pub mod outbound;
