//! MCP サーバー本体（同期ループ: 1 行読んで 1 行返す）

use crate::adapter::mcp::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, MCP_PROTOCOL_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::adapter::mcp::resource::{ConfluencePageUri, CONFLUENCE_URI_TEMPLATE};
use crate::usecase::PageUseCase;
use anyhow::{Context, Result};
use common::ports::outbound::{Log, LogLevel, LogRecord};
use common::tool::{ToolContext, ToolError, ToolRegistry};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::sync::Arc;

const SERVER_NAME: &str = "conduit";

pub struct McpServer {
    registry: ToolRegistry,
    ctx: ToolContext,
    pages: Arc<PageUseCase>,
    logger: Arc<dyn Log>,
}

impl McpServer {
    pub fn new(
        registry: ToolRegistry,
        ctx: ToolContext,
        pages: Arc<PageUseCase>,
        logger: Arc<dyn Log>,
    ) -> Self {
        Self {
            registry,
            ctx,
            pages,
            logger,
        }
    }

    /// EOF まで読み続ける
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        self.log(LogLevel::Info, "server started", None);
        for line in input.lines() {
            let line = line.context("Failed to read request line")?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                let text = serde_json::to_string(&response).context("Failed to encode response")?;
                writeln!(output, "{}", text).context("Failed to write response")?;
                output.flush().context("Failed to flush response")?;
            }
        }
        self.log(LogLevel::Info, "server stopped", None);
        Ok(())
    }

    /// 1 行を処理する。通知なら None。
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                self.log(LogLevel::Warn, "parse error", Some(e.to_string()));
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };
        let notification = request.is_notification();
        let id = request.id.clone().unwrap_or(Value::Null);
        let outcome = self.dispatch(&request);
        if notification {
            return None;
        }
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                self.log(LogLevel::Warn, "request failed", Some(error.message.clone()));
                JsonRpcResponse::error(id, error)
            }
        })
    }

    fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(JsonRpcError::new(
                INVALID_REQUEST,
                format!("Invalid JSON-RPC version: {}", request.jsonrpc),
            ));
        }
        let params = request.params.clone().unwrap_or_else(|| json!({}));
        match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list()),
            "tools/call" => self.tools_call(&params),
            "resources/list" => Ok(json!({ "resources": [] })),
            "resources/templates/list" => Ok(json!({
                "resourceTemplates": [{
                    "uriTemplate": CONFLUENCE_URI_TEMPLATE,
                    "name": "Confluence page",
                    "description": "Confluence page content rendered as Markdown",
                    "mimeType": "text/markdown"
                }]
            })),
            "resources/read" => self.resources_read(&params),
            m if m.starts_with("notifications/") => Ok(Value::Null),
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false, "subscribe": false }
            },
            "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
        })
    }

    fn tools_list(&self) -> Value {
        let tools: Vec<Value> = self
            .registry
            .tools()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    /// ツールの失敗は isError 付きの結果として返す（プロトコルエラーにはしない）
    fn tools_call(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing tool name"))?;
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        match self.registry.call(name, args, &self.ctx) {
            Ok(value) => Ok(text_result(&value, false)),
            Err(ToolError::NotFound(n)) => Err(JsonRpcError::new(
                INVALID_PARAMS,
                format!("Unknown tool: {}", n),
            )),
            Err(e) => {
                let _ = self.logger.log(
                    &LogRecord::new(LogLevel::Error, "tool failed")
                        .layer("mcp")
                        .kind("error")
                        .field("tool", name)
                        .field("error", e.to_string()),
                );
                Ok(text_result(&Value::String(e.to_string()), true))
            }
        }
    }

    fn resources_read(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let uri = params
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing resource uri"))?;
        let page_uri = ConfluencePageUri::parse(uri)
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, e.to_string()))?;
        let site = page_uri.site.clone().or_else(|| self.ctx.default_site.clone());
        let markdown = self
            .pages
            .content(site.as_deref(), &page_uri.space_key, &page_uri.title)
            .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?;
        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "text/markdown",
                "text": markdown
            }]
        }))
    }

    fn log(&self, level: LogLevel, message: &str, error: Option<String>) {
        let mut record = LogRecord::new(level, message).layer("mcp").kind("lifecycle");
        if let Some(e) = error {
            record = record.field("error", e);
        }
        let _ = self.logger.log(&record);
    }
}

/// ツール結果を MCP の text content にする（文字列はそのまま、それ以外は整形 JSON）
fn text_result(value: &Value, is_error: bool) -> Value {
    let text = match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}
