//! クレート単位のシナリオテスト（スタブのプラットフォームで usecase / MCP を通す）

mod stubs;

mod issue_commands_tests;
mod mcp_server_tests;
