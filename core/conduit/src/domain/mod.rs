//! ドメイン型（Newtype、enum、ルール）

pub mod command;
pub mod config;
pub mod issue;

pub use command::{ConduitCommand, ConfigCommand, ConfluenceCommand, JiraCommand};
pub use config::{ConduitConfig, SiteConfig};
pub use issue::{IssueKey, IssueUpdate, NewIssue, PlatformName, DEFAULT_ISSUE_TYPE};
