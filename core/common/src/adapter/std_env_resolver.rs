//! 標準環境変数解決実装（std::env を委譲）

use crate::domain::Dirs;
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "conduit";

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var(name).ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

impl EnvResolver for StdEnvResolver {
    fn resolve_dirs(&self) -> Result<Dirs, Error> {
        if let Some(home) = non_empty_var("CONDUIT_HOME") {
            let state = home.join("state");
            return Ok(Dirs::new(home, state));
        }

        let home = non_empty_var("HOME");
        let config_base = non_empty_var("XDG_CONFIG_HOME")
            .or_else(|| home.as_ref().map(|h| h.join(".config")))
            .ok_or_else(|| Error::env("HOME is not set"))?;
        let state_base = non_empty_var("XDG_STATE_HOME")
            .or_else(|| home.as_ref().map(|h| h.join(".local").join("state")))
            .ok_or_else(|| Error::env("HOME is not set"))?;

        Ok(Dirs::new(
            config_base.join(APP_DIR_NAME),
            state_base.join(APP_DIR_NAME),
        ))
    }

    fn current_dir(&self) -> Result<PathBuf, Error> {
        env::current_dir()
            .map_err(|e| Error::io_msg(format!("Failed to get current directory: {}", e)))
    }
}
