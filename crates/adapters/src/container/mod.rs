// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime seam.
//!
//! The orchestrator never talks to a container engine directly; it goes
//! through [`ContainerRuntime`]. Production uses [`DockerCli`] (the `docker`
//! binary via subprocess), tests use `FakeRuntime`.

mod docker;
#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use docker::DockerCli;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRuntime;

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Everything needed to start one worker container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Deterministic container name (one per agent id).
    pub name: String,
    pub image: String,
    /// Host port mapped to [`ContainerSpec::container_port`].
    pub host_port: u16,
    pub container_port: u16,
    /// Environment variables passed through `-e`.
    pub env: Vec<(String, String)>,
    /// Host directory bind-mounted at `/data` inside the container.
    pub data_dir: PathBuf,
    pub network: Option<String>,
}

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),
    #[error("docker {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("failed to exec docker: {0}")]
    Exec(#[from] std::io::Error),
}

/// Container lifecycle operations the orchestrator depends on.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Start a detached container and return its runtime id.
    async fn run(&self, spec: &ContainerSpec) -> Result<String, ContainerError>;

    /// Whether the container is currently running. Unknown ids report false.
    async fn is_running(&self, container_id: &str) -> bool;

    /// Stop a running container, allowing `grace` before the engine kills it.
    /// Stopping an already-stopped container is a no-op; an unknown id is
    /// [`ContainerError::NotFound`].
    async fn stop(&self, container_id: &str, grace: Duration) -> Result<(), ContainerError>;

    /// Force-remove a container by name. Succeeds when no such container
    /// exists, so stale-name cleanup before a fresh run is unconditional.
    async fn remove_by_name(&self, name: &str) -> Result<(), ContainerError>;
}
