// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host configuration.

use std::path::PathBuf;
use std::time::Duration;

pub const CONTAINER_PORT: u16 = 8080;

/// Tunables for a [`crate::Host`]. Built with chained setters:
///
/// ```ignore
/// let config = HostConfig::new("/var/lib/agenthost")
///     .base_port(9100)
///     .idle_timeout(Duration::from_secs(15 * 60));
/// ```
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Root directory for the registry file and per-agent data dirs.
    pub state_dir: PathBuf,
    /// First host port handed out; allocation counts up from here.
    pub base_port: u16,
    /// Image every worker container runs.
    pub worker_image: String,
    /// Docker network to attach workers to, if any.
    pub network: Option<String>,
    /// Idle time after which the reaper stops a running agent.
    pub idle_timeout: Duration,
    /// How long a starting container may take to pass its health check.
    pub startup_timeout: Duration,
    /// Delay between health probes during startup.
    pub health_poll_interval: Duration,
    /// Ceiling on a single dispatched chat turn.
    pub chat_timeout: Duration,
    /// Grace given to a container before the engine kills it on stop.
    pub stop_grace: Duration,
    /// Delay between reaper sweeps.
    pub reaper_interval: Duration,
    /// Extra environment variables injected into every worker container
    /// (credentials, model endpoints).
    pub extra_env: Vec<(String, String)>,
}

impl HostConfig {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            base_port: 9000,
            worker_image: "agenthost-worker:latest".into(),
            network: None,
            idle_timeout: Duration::from_secs(30 * 60),
            startup_timeout: Duration::from_secs(30),
            health_poll_interval: Duration::from_millis(500),
            chat_timeout: Duration::from_secs(600),
            stop_grace: Duration::from_secs(10),
            reaper_interval: Duration::from_secs(60),
            extra_env: Vec::new(),
        }
    }

    ah_core::setters! {
        into {
            worker_image: String,
        }
        set {
            base_port: u16,
            idle_timeout: Duration,
            startup_timeout: Duration,
            health_poll_interval: Duration,
            chat_timeout: Duration,
            stop_grace: Duration,
            reaper_interval: Duration,
            extra_env: Vec<(String, String)>,
        }
        option {
            network: String,
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.state_dir.join("registry.json")
    }

    /// Default data directory for an agent (overridable per record).
    pub fn agent_data_dir(&self, agent_id: &ah_core::AgentId) -> PathBuf {
        self.state_dir.join("agents").join(agent_id.as_str())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
