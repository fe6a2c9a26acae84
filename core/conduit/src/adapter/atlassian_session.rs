//! Atlassian REST API 用の同期 HTTP セッション（reqwest::blocking + Basic 認証）
//!
//! Jira / Confluence クライアントが共有する。リトライはしない。

use crate::domain::SiteConfig;
use common::error::Error;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 接続済みセッション
pub struct AtlassianSession {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl AtlassianSession {
    /// サイト設定からセッションを作る（ネットワークには触れない）
    pub fn new(site: &SiteConfig) -> Result<Self, Error> {
        let base_url = site.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::config("Site URL is empty"));
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(Error::config(format!(
                "Site URL must start with http:// or https://: {}",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            email: site.email.clone(),
            api_token: site.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET（クエリ付き）。2xx の JSON ボディを返す。
    pub fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, Error> {
        self.send(self.request(Method::GET, path).query(query))
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.send(self.request(Method::POST, path).json(body))
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.send(self.request(Method::PUT, path).json(body))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    fn send(&self, request: RequestBuilder) -> Result<Value, Error> {
        let response = request
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::http(format!(
                "HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&text)
            )));
        }
        // 204 No Content 等
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))
    }
}

/// Atlassian のエラーボディ（errorMessages / errors / message）から人間向けメッセージを取り出す
pub fn extract_error_message(body: &str) -> String {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let mut parts: Vec<String> = Vec::new();
    if let Some(msgs) = v.get("errorMessages").and_then(|m| m.as_array()) {
        parts.extend(msgs.iter().filter_map(|m| m.as_str()).map(str::to_string));
    }
    if let Some(errors) = v.get("errors").and_then(|m| m.as_object()) {
        parts.extend(
            errors
                .iter()
                .map(|(field, msg)| format!("{}: {}", field, msg.as_str().unwrap_or_default())),
        );
    }
    if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
        parts.push(msg.to_string());
    }
    if parts.is_empty() {
        body.trim().to_string()
    } else {
        parts.join("; ")
    }
}
