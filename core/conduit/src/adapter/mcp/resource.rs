//! `confluence://{space_key}/{page_title}?site={alias}` リソース URI

use common::error::Error;

pub const CONFLUENCE_SCHEME: &str = "confluence://";

/// リソーステンプレート（resources/templates/list で公開）
pub const CONFLUENCE_URI_TEMPLATE: &str = "confluence://{space_key}/{page_title}?site={site}";

/// 解析済みの Confluence ページ URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfluencePageUri {
    pub space_key: String,
    pub title: String,
    pub site: Option<String>,
}

impl ConfluencePageUri {
    /// タイトルはパーセントデコードする。site が空なら None。
    pub fn parse(uri: &str) -> Result<Self, Error> {
        let rest = uri
            .strip_prefix(CONFLUENCE_SCHEME)
            .ok_or_else(|| Error::invalid_argument(format!("Unsupported resource URI: {}", uri)))?;
        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (rest, None),
        };
        let (space_key, raw_title) = path
            .split_once('/')
            .filter(|(space, title)| !space.is_empty() && !title.is_empty())
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "Resource URI must be {}: {}",
                    CONFLUENCE_URI_TEMPLATE, uri
                ))
            })?;
        let title = urlencoding::decode(raw_title)
            .map_err(|e| Error::invalid_argument(format!("Invalid page title encoding: {}", e)))?
            .trim_end_matches('?')
            .to_string();

        let site = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .find_map(|pair| pair.strip_prefix("site="))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            space_key: space_key.to_string(),
            title,
            site,
        })
    }
}
