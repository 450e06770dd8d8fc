//! Tunables for the devorch commands.
//!
//! Read from `.devorch/config.toml` under the project root. Each key resolves
//! as: `DEVORCH_<KEY>` env var > config file > built-in default. A missing
//! file means defaults; a malformed one is an error.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fs::Workspace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Phase context longer than this many characters is written to a file.
    pub phase_context_threshold: usize,
    /// Goal text beyond this many characters is truncated in commit messages.
    pub commit_goal_max_len: usize,
    /// Files with fewer non-comment lines than this are reported as stubs.
    pub stub_min_meaningful_lines: usize,
    /// How many recent commits the build summary scans.
    pub commit_log_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            phase_context_threshold: 25_000,
            commit_goal_max_len: 50,
            stub_min_meaningful_lines: 3,
            commit_log_limit: 20,
        }
    }
}

impl Config {
    /// Load the workspace config file and apply environment overrides.
    pub fn load(workspace: &Workspace) -> Result<Self> {
        let path = workspace.config_file();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        override_from_env("DEVORCH_PHASE_CONTEXT_THRESHOLD", &mut self.phase_context_threshold)?;
        override_from_env("DEVORCH_COMMIT_GOAL_MAX_LEN", &mut self.commit_goal_max_len)?;
        override_from_env(
            "DEVORCH_STUB_MIN_MEANINGFUL_LINES",
            &mut self.stub_min_meaningful_lines,
        )?;
        override_from_env("DEVORCH_COMMIT_LOG_LIMIT", &mut self.commit_log_limit)?;
        Ok(())
    }
}

fn override_from_env<T>(var: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Ok(raw) = env::var(var) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {var}: {raw}"))?;
    }
    Ok(())
}
