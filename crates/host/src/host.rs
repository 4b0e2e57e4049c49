// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle controller.
//!
//! [`Host`] owns the registry and the container/worker seams. Lifecycle
//! rules:
//!
//! - One container per agent id, named deterministically, so stale-name
//!   cleanup before a fresh run is always safe.
//! - A host port is allocated once per agent and reused across restarts.
//! - A container counts as started only once its health endpoint answers
//!   within the startup timeout; otherwise the record lands in `Error`.
//! - `Error` is retryable: the next `ensure_running` starts from scratch.

use crate::config::{HostConfig, CONTAINER_PORT};
use ah_adapters::{ContainerError, ContainerRuntime, ContainerSpec, WorkerApi};
use ah_core::{AgentId, AgentRecord, AgentStatus, Clock};
use ah_storage::{Registry, RegistryError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub const INSTRUCTIONS_FILE: &str = "instructions.txt";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Worker(#[from] ah_adapters::WorkerApiError),
    #[error("instructions file {path}: {reason}")]
    Instructions { path: PathBuf, reason: String },
    #[error("failed to prepare data dir {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("agent {agent_id} did not become healthy within {waited_ms}ms")]
    StartupTimeout { agent_id: AgentId, waited_ms: u64 },
}

/// Per-dispatch options for resolving custom instructions.
///
/// A file takes precedence over inline text. Instructions only apply to
/// agents without a persisted session; afterwards they are ignored so a
/// restart cannot silently rewrite an agent's standing prompt.
#[derive(Debug, Clone, Default)]
pub struct EnsureOptions {
    pub instructions: Option<String>,
    pub instructions_file: Option<PathBuf>,
}

impl EnsureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    ah_core::setters! {
        option {
            instructions: String,
            instructions_file: PathBuf,
        }
    }
}

/// One row of [`Host::list_agents`]: the reconciled record plus whether the
/// worker is mid-turn right now.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentSummary {
    #[serde(flatten)]
    pub record: AgentRecord,
    pub processing: bool,
}

/// The orchestrator. Cheap to clone; all clones share the registry and
/// the port counter.
pub struct Host<R, W, C> {
    pub(crate) config: HostConfig,
    pub(crate) registry: Registry,
    pub(crate) runtime: Arc<R>,
    pub(crate) worker: Arc<W>,
    pub(crate) clock: C,
    next_port: Arc<AtomicU16>,
}

impl<R, W, C: Clone> Clone for Host<R, W, C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: self.registry.clone(),
            runtime: Arc::clone(&self.runtime),
            worker: Arc::clone(&self.worker),
            clock: self.clock.clone(),
            next_port: Arc::clone(&self.next_port),
        }
    }
}

impl<R, W, C> Host<R, W, C>
where
    R: ContainerRuntime,
    W: WorkerApi,
    C: Clock,
{
    pub fn new(config: HostConfig, runtime: R, worker: W, clock: C) -> Self {
        let registry = Registry::new(config.registry_path());
        let next_port = Arc::new(AtomicU16::new(config.base_port));
        Self { config, registry, runtime: Arc::new(runtime), worker: Arc::new(worker), clock, next_port }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Host data directory backing the agent's `/data` mount.
    pub fn data_dir(&self, record: &AgentRecord) -> PathBuf {
        record
            .data_dir
            .clone()
            .unwrap_or_else(|| self.config.agent_data_dir(&record.agent_id))
    }

    /// Next free host port: counts up from the base port, skipping ports
    /// already held by registered agents.
    fn allocate_port(&self) -> Result<u16, HostError> {
        let in_use = self.registry.ports_in_use()?;
        loop {
            let port = self.next_port.fetch_add(1, Ordering::Relaxed);
            if !in_use.contains(&port) {
                return Ok(port);
            }
        }
    }

    /// Make the agent's container running and healthy, creating the record
    /// on first contact. Already-healthy agents return immediately.
    pub async fn ensure_running(
        &self,
        agent_id: &AgentId,
        opts: &EnsureOptions,
    ) -> Result<AgentRecord, HostError> {
        // Bad instructions are a caller error; fail before touching anything.
        let instructions = resolve_instructions(opts)?;

        if let Some(record) = self.registry.get(agent_id)? {
            if record.is_running() {
                if let Some(ref cid) = record.container_id {
                    if self.runtime.is_running(cid).await {
                        return Ok(record);
                    }
                }
                tracing::warn!(agent_id = %agent_id, "container gone, record said running");
                self.registry.update(agent_id, |r| r.status = AgentStatus::Stopped)?;
            }
        }

        self.start_agent(agent_id, instructions).await
    }

    async fn start_agent(
        &self,
        agent_id: &AgentId,
        instructions: Option<String>,
    ) -> Result<AgentRecord, HostError> {
        let now = self.clock.epoch_ms();
        let mut record = match self.registry.get(agent_id)? {
            Some(existing) => existing,
            None => AgentRecord::new(agent_id.clone(), self.allocate_port()?, now),
        };

        let data_dir = self.data_dir(&record);
        prepare_data_dir(&data_dir)?;

        let custom_instructions = match instructions {
            Some(text) if !ah_storage::has_session(&data_dir) => {
                let path = data_dir.join(INSTRUCTIONS_FILE);
                std::fs::write(&path, text)
                    .map_err(|source| HostError::DataDir { path: data_dir.clone(), source })?;
                true
            }
            Some(_) => {
                tracing::warn!(
                    agent_id = %agent_id,
                    "agent already has a session, ignoring new instructions"
                );
                data_dir.join(INSTRUCTIONS_FILE).exists()
            }
            None => data_dir.join(INSTRUCTIONS_FILE).exists(),
        };

        // A previous run may have left a stopped container under our name.
        self.runtime.remove_by_name(&record.container_name).await?;

        let mut env: Vec<(String, String)> = vec![
            ("AGENT_ID".into(), agent_id.to_string()),
            (
                "AH_IDLE_TIMEOUT_MINUTES".into(),
                (self.config.idle_timeout.as_secs() / 60).to_string(),
            ),
        ];
        if custom_instructions {
            env.push(("CUSTOM_INSTRUCTIONS".into(), "true".into()));
        }
        env.extend(self.config.extra_env.iter().cloned());

        let spec = ContainerSpec {
            name: record.container_name.clone(),
            image: self.config.worker_image.clone(),
            host_port: record.port,
            container_port: CONTAINER_PORT,
            env,
            data_dir,
            network: self.config.network.clone(),
        };

        record.status = AgentStatus::Starting;
        record.container_id = None;
        record.touch(now);
        self.registry.upsert(record.clone())?;

        let container_id = match self.runtime.run(&spec).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(agent_id = %agent_id, error = %e, "container start failed");
                self.registry.update(agent_id, |r| r.status = AgentStatus::Error)?;
                return Err(e.into());
            }
        };

        record.container_id = Some(container_id);
        self.registry.upsert(record.clone())?;

        self.wait_until_healthy(agent_id, record.port).await?;

        let updated = self
            .registry
            .update(agent_id, |r| {
                r.status = AgentStatus::Running;
                r.touch(self.clock.epoch_ms());
            })?
            .ok_or_else(|| HostError::UnknownAgent(agent_id.clone()))?;
        tracing::info!(agent_id = %agent_id, port = updated.port, "agent running");
        Ok(updated)
    }

    /// Poll the worker's health endpoint until it answers or the startup
    /// timeout elapses.
    async fn wait_until_healthy(&self, agent_id: &AgentId, port: u16) -> Result<(), HostError> {
        let deadline = tokio::time::Instant::now() + self.config.startup_timeout;
        loop {
            if self.worker.health(port).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                self.registry.update(agent_id, |r| r.status = AgentStatus::Error)?;
                return Err(HostError::StartupTimeout {
                    agent_id: agent_id.clone(),
                    waited_ms: self.config.startup_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.config.health_poll_interval).await;
        }
    }

    /// Stop the agent's container and mark the record stopped. Stopping a
    /// stopped agent is a no-op; an unregistered id is an error.
    pub async fn stop_agent(&self, agent_id: &AgentId) -> Result<AgentRecord, HostError> {
        let record = self
            .registry
            .get(agent_id)?
            .ok_or_else(|| HostError::UnknownAgent(agent_id.clone()))?;

        if let Some(ref cid) = record.container_id {
            match self.runtime.stop(cid, self.config.stop_grace).await {
                Ok(()) => {}
                // Already gone counts as stopped
                Err(ContainerError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let updated = self
            .registry
            .update(agent_id, |r| {
                r.status = AgentStatus::Stopped;
                r.touch(self.clock.epoch_ms());
            })?
            .ok_or_else(|| HostError::UnknownAgent(agent_id.clone()))?;
        tracing::info!(agent_id = %agent_id, "agent stopped");
        Ok(updated)
    }

    /// All registered agents with status reconciled against the actual
    /// container state, plus live `processing` for running workers.
    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>, HostError> {
        let mut out = Vec::new();
        for (agent_id, record) in self.registry.load()? {
            let mut record = record;
            if record.is_running() {
                let alive = match record.container_id {
                    Some(ref cid) => self.runtime.is_running(cid).await,
                    None => false,
                };
                if !alive {
                    record = self
                        .registry
                        .update(&agent_id, |r| r.status = AgentStatus::Stopped)?
                        .unwrap_or(record);
                }
            }
            let processing = record.is_running()
                && self.worker.health(record.port).await.map(|h| h.processing).unwrap_or(false);
            out.push(AgentSummary { record, processing });
        }
        Ok(out)
    }
}

/// Resolve custom instructions: a file wins over inline text, and a
/// missing, unreadable, or blank file is a configuration error.
fn resolve_instructions(opts: &EnsureOptions) -> Result<Option<String>, HostError> {
    if let Some(ref path) = opts.instructions_file {
        let text = std::fs::read_to_string(path).map_err(|e| HostError::Instructions {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Err(HostError::Instructions {
                path: path.clone(),
                reason: "file is empty".into(),
            });
        }
        return Ok(Some(text));
    }
    Ok(opts.instructions.as_ref().filter(|t| !t.trim().is_empty()).cloned())
}

fn prepare_data_dir(data_dir: &Path) -> Result<(), HostError> {
    for dir in [data_dir.to_path_buf(), data_dir.join("workspace"), data_dir.join("tools")] {
        std::fs::create_dir_all(&dir)
            .map_err(|source| HostError::DataDir { path: dir.clone(), source })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
