// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker CLI runtime.
//!
//! Shells out to the `docker` binary rather than speaking the engine API.
//! Every operation is a single subprocess invocation; stdout is the result,
//! stderr becomes the error.

use super::{ContainerError, ContainerRuntime, ContainerSpec};
use async_trait::async_trait;
use std::time::Duration;

/// [`ContainerRuntime`] backed by the `docker` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerCli;

impl DockerCli {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn run(&self, spec: &ContainerSpec) -> Result<String, ContainerError> {
        let args = run_args(spec);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::info!(
            container_name = %spec.name,
            image = %spec.image,
            host_port = spec.host_port,
            "starting container"
        );
        let container_id = run_docker(&arg_refs).await?;
        Ok(container_id)
    }

    async fn is_running(&self, container_id: &str) -> bool {
        matches!(
            run_docker(&["inspect", "-f", "{{.State.Running}}", container_id]).await,
            Ok(out) if out == "true"
        )
    }

    async fn stop(&self, container_id: &str, grace: Duration) -> Result<(), ContainerError> {
        let grace_secs = grace.as_secs().to_string();
        match run_docker(&["stop", "-t", &grace_secs, container_id]).await {
            Ok(_) => Ok(()),
            Err(ContainerError::CommandFailed { stderr, .. }) if is_no_such_container(&stderr) => {
                Err(ContainerError::NotFound(container_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn remove_by_name(&self, name: &str) -> Result<(), ContainerError> {
        match run_docker(&["rm", "-f", name]).await {
            Ok(_) => Ok(()),
            Err(ContainerError::CommandFailed { stderr, .. }) if is_no_such_container(&stderr) => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Build the `docker run` argument list for a container spec.
fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "run".into(),
        "-d".into(),
        "--name".into(),
        spec.name.clone(),
        "-p".into(),
        format!("{}:{}", spec.host_port, spec.container_port),
        "-v".into(),
        format!("{}:/data", spec.data_dir.display()),
    ];
    for (key, val) in &spec.env {
        args.push("-e".into());
        args.push(format!("{}={}", key, val));
    }
    if let Some(ref network) = spec.network {
        args.push("--network".into());
        args.push(network.clone());
    }
    args.push(spec.image.clone());
    args
}

fn is_no_such_container(stderr: &str) -> bool {
    stderr.to_ascii_lowercase().contains("no such container")
}

/// Run a docker CLI command and return trimmed stdout on success.
async fn run_docker(args: &[&str]) -> Result<String, ContainerError> {
    let output = tokio::process::Command::new("docker").args(args).output().await?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(ContainerError::CommandFailed {
            command: args.first().unwrap_or(&"").to_string(),
            stderr,
        })
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
