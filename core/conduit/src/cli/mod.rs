//! CLI 境界（clap による引数解析）

pub mod args;

pub use args::{parse_args, print_completion, Config, ParseOutcome};
