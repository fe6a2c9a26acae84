//! MCP サーバーが公開するツールの抽象（trait で副作用隔離）
//!
//! ToolRegistry で name -> Arc<dyn Tool> を解決する。ToolContext はサーバー起動時の既定値を束ねる。

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// ツール実行エラー（ドメイン層）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// ツール実行コンテキスト
pub struct ToolContext {
    /// 引数で site_alias が省略されたときに使うサイト（`conduit --site <alias> mcp`）
    pub default_site: Option<String>,
}

impl ToolContext {
    pub fn new(default_site: Option<String>) -> Self {
        Self { default_site }
    }

    /// 引数の `site_alias` を優先し、無ければ既定サイトを返す
    pub fn site_alias(&self, args: &Value) -> Option<String> {
        args.get("site_alias")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_site.clone())
    }
}

/// ツールのトレイト
pub trait Tool: Send + Sync {
    /// ツール名（tools/call の name と一致させる）
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// 入力の JSON Schema
    fn input_schema(&self) -> Value;
    /// 引数とコンテキストで実行し、JSON 結果を返す
    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError>;
}

/// ツール名で解決するレジストリ（tools/list の順序を安定させるため BTreeMap）
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// 名前順のツール一覧
    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    pub fn call(&self, name: &str, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(args, ctx)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// 必須の文字列引数を取り出す
pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArgs(format!("missing '{}'", key)))
}

/// 任意の文字列引数
pub fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}
