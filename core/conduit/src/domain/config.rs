//! 設定ファイル（config.json）の型
//!
//! Jira / Confluence それぞれに複数サイトを持ち、エイリアスで切り替える。

use crate::domain::PlatformName;
use common::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 既定サイトのエイリアス名
pub const DEFAULT_SITE_ALIAS: &str = "default";

const MASKED_TOKEN: &str = "****";

fn default_site_alias() -> String {
    DEFAULT_SITE_ALIAS.to_string()
}

/// 1 サイト分の接続情報（Basic 認証: email + API トークン）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    pub email: String,
    pub api_token: String,
}

/// プラットフォームごとのサイト群
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_site_alias")]
    pub default_site_alias: String,
    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            default_site_alias: default_site_alias(),
            sites: BTreeMap::new(),
        }
    }
}

impl PlatformConfig {
    /// エイリアス指定があればそのサイト、無ければ default_site_alias のサイトを返す
    pub fn get_site_config(&self, alias: Option<&str>) -> Result<&SiteConfig, Error> {
        let alias = alias.unwrap_or(&self.default_site_alias);
        self.sites.get(alias).ok_or_else(|| {
            let known: Vec<&str> = self.sites.keys().map(String::as_str).collect();
            Error::config(format!(
                "Site '{}' not found in configuration (available: {})",
                alias,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            ))
        })
    }

    /// API トークンを伏せた表示用 JSON
    pub fn masked(&self) -> Value {
        let sites: serde_json::Map<String, Value> = self
            .sites
            .iter()
            .map(|(alias, site)| {
                (
                    alias.clone(),
                    json!({ "url": site.url, "email": site.email, "api_token": MASKED_TOKEN }),
                )
            })
            .collect();
        json!({
            "default_site_alias": self.default_site_alias,
            "sites": sites,
        })
    }
}

/// config.json 全体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConduitConfig {
    #[serde(default)]
    pub jira: PlatformConfig,
    #[serde(default)]
    pub confluence: PlatformConfig,
    /// ステージングディレクトリ。省略時は設定ディレクトリ直下の content/
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_dir: Option<PathBuf>,
}

impl ConduitConfig {
    pub fn platform(&self, platform: PlatformName) -> &PlatformConfig {
        match platform {
            PlatformName::Jira => &self.jira,
            PlatformName::Confluence => &self.confluence,
        }
    }

    /// `config init` で書き出すひな形
    pub fn template() -> Self {
        let example = |host: &str| SiteConfig {
            url: format!("https://{}", host),
            email: "you@example.com".to_string(),
            api_token: "your-api-token".to_string(),
        };
        let mut jira = PlatformConfig::default();
        jira.sites
            .insert(DEFAULT_SITE_ALIAS.to_string(), example("your-domain.atlassian.net"));
        let mut confluence = PlatformConfig::default();
        confluence.sites.insert(
            DEFAULT_SITE_ALIAS.to_string(),
            example("your-domain.atlassian.net/wiki"),
        );
        Self {
            jira,
            confluence,
            content_dir: None,
        }
    }

    /// トークンを伏せた設定一覧（`config list` / MCP の list_config）
    pub fn masked(&self) -> Value {
        let mut v = json!({
            "jira": self.jira.masked(),
            "confluence": self.confluence.masked(),
        });
        if let Some(dir) = &self.content_dir {
            v["content_dir"] = json!(dir.display().to_string());
        }
        v
    }
}
