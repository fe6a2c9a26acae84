//! Outbound ポート: アプリが外界（Jira・Confluence・設定ファイル）を使うための trait
//!
//! ファイル・時刻・ログ等の汎用ポートは common::ports::outbound を使う。

pub mod config_repository;
pub mod issue_tracker;
pub mod page_store;
pub mod platform_factory;

pub use config_repository::ConfigRepository;
pub use issue_tracker::IssueTracker;
pub use page_store::PageStore;
pub use platform_factory::PlatformFactory;
