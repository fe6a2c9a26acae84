//! MCP（Model Context Protocol）サーバー: stdio 上の行区切り JSON-RPC
//!
//! stdout はプロトコル専用。ログは Log ポート（ファイル）にのみ書く。

pub mod protocol;
pub mod resource;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::build_registry;
