//! ユースケース層（ポート経由でのみ外界に触れる）

pub mod config;
pub mod connect;
pub mod issue;
pub mod page;
pub mod staging;

pub use config::ConfigUseCase;
pub use connect::ConnectUseCase;
pub use issue::{CreateIssueInput, IssueUseCase};
pub use page::PageUseCase;
pub use staging::{StagedFailure, StagingUseCase};
