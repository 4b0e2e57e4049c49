// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker configuration from container environment.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_AGENT_ID: &str = "AGENT_ID";
pub const ENV_DATA_DIR: &str = "AH_DATA_DIR";
pub const ENV_PORT: &str = "AH_WORKER_PORT";
pub const ENV_IDLE_TIMEOUT_MINUTES: &str = "AH_IDLE_TIMEOUT_MINUTES";
pub const ENV_CUSTOM_INSTRUCTIONS: &str = "CUSTOM_INSTRUCTIONS";
pub const ENV_AGENT_CMD: &str = "AH_AGENT_CMD";

const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("instructions flagged but {path} is unreadable or empty")]
    Instructions { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub agent_id: String,
    /// Mounted host data directory (session store, instructions, tools).
    pub data_dir: PathBuf,
    pub port: u16,
    /// Idle period after which the worker exits on its own. `None`
    /// disables self-shutdown.
    pub idle_timeout: Option<Duration>,
    /// Orchestrator placed custom instructions in the data dir.
    pub custom_instructions: bool,
    /// Command line the turn runner executes, whitespace-separated.
    pub agent_cmd: Vec<String>,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let agent_id =
            std::env::var(ENV_AGENT_ID).map_err(|_| ConfigError::Missing(ENV_AGENT_ID))?;
        let data_dir = std::env::var(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
        let port = std::env::var(ENV_PORT)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let idle_timeout = std::env::var(ENV_IDLE_TIMEOUT_MINUTES)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&m| m > 0)
            .map(|m| Duration::from_secs(m * 60));
        let custom_instructions = std::env::var(ENV_CUSTOM_INSTRUCTIONS)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let agent_cmd = std::env::var(ENV_AGENT_CMD)
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self { agent_id, data_dir, port, idle_timeout, custom_instructions, agent_cmd })
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.data_dir.join("instructions.txt")
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.data_dir.join("tools")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
