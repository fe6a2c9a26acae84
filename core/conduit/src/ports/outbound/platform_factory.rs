//! プラットフォームクライアント生成 Outbound ポート
//!
//! サイトエイリアスごとにクライアントを組み立てる。テストではスタブを返す実装を注入する。

use crate::ports::outbound::{IssueTracker, PageStore};
use common::error::Error;
use std::sync::Arc;

pub trait PlatformFactory: Send + Sync {
    /// site が None なら設定の default_site_alias を使う
    fn issue_tracker(&self, site: Option<&str>) -> Result<Arc<dyn IssueTracker>, Error>;
    fn page_store(&self, site: Option<&str>) -> Result<Arc<dyn PageStore>, Error>;
}
