//! ドキュメント（Confluence）Outbound ポート

use common::error::Error;
use serde_json::Value;

/// ページストアのクライアント
///
/// connect 前の呼び出しは "Not connected to Confluence" で失敗する。
pub trait PageStore: Send + Sync {
    fn connect(&self) -> Result<(), Error>;
    /// スペース内のページを先頭から最大 limit 件
    fn get_pages_by_space(&self, space_key: &str, limit: u32) -> Result<Vec<Value>, Error>;
    /// スペース内の全ページ（batch_size ずつページング）
    fn get_all_pages_by_space(&self, space_key: &str, batch_size: u32) -> Result<Vec<Value>, Error>;
    fn get_child_pages(&self, parent_id: &str, limit: u32) -> Result<Vec<Value>, Error>;
    /// タイトル完全一致のページ（本文 storage 形式込み）。無ければ None。
    fn get_page_by_title(&self, space_key: &str, title: &str) -> Result<Option<Value>, Error>;
}
