// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory container runtime for tests.

use super::{ContainerError, ContainerRuntime, ContainerSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One fake container with the spec it was started from.
#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub spec: ContainerSpec,
    pub running: bool,
}

#[derive(Default)]
struct Inner {
    containers: HashMap<String, FakeContainer>,
    next_id: u64,
    fail_run: bool,
    fail_stop: std::collections::HashSet<String>,
    stopped: Vec<String>,
    removed: Vec<String>,
}

/// [`ContainerRuntime`] that keeps containers in a map.
///
/// Knobs: `fail_next_run` makes the next `run` fail, `kill` flips a
/// container to not-running without going through `stop` (a crash).
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_run(&self) {
        self.inner.lock().fail_run = true;
    }

    /// Make every `stop` of the named container fail.
    pub fn fail_stop(&self, name: &str) {
        self.inner.lock().fail_stop.insert(name.to_string());
    }

    /// Simulate a container dying out from under the orchestrator.
    pub fn kill(&self, name: &str) {
        if let Some(c) = self.inner.lock().containers.get_mut(name) {
            c.running = false;
        }
    }

    pub fn container(&self, name: &str) -> Option<FakeContainer> {
        self.inner.lock().containers.get(name).cloned()
    }

    pub fn running_names(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut names: Vec<String> = inner
            .containers
            .values()
            .filter(|c| c.running)
            .map(|c| c.spec.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Container ids passed to `stop`, in call order.
    pub fn stopped_ids(&self) -> Vec<String> {
        self.inner.lock().stopped.clone()
    }

    /// Names passed to `remove_by_name`, in call order.
    pub fn removed_names(&self) -> Vec<String> {
        self.inner.lock().removed.clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn run(&self, spec: &ContainerSpec) -> Result<String, ContainerError> {
        let mut inner = self.inner.lock();
        if inner.fail_run {
            inner.fail_run = false;
            return Err(ContainerError::CommandFailed {
                command: "run".into(),
                stderr: "injected failure".into(),
            });
        }
        inner.next_id += 1;
        let id = format!("fake-{:04}", inner.next_id);
        inner.containers.insert(
            spec.name.clone(),
            FakeContainer { id: id.clone(), spec: spec.clone(), running: true },
        );
        Ok(id)
    }

    async fn is_running(&self, container_id: &str) -> bool {
        self.inner
            .lock()
            .containers
            .values()
            .any(|c| c.id == container_id && c.running)
    }

    async fn stop(&self, container_id: &str, _grace: Duration) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.stopped.push(container_id.to_string());
        let fail_stop = inner.fail_stop.clone();
        match inner.containers.values_mut().find(|c| c.id == container_id) {
            Some(c) if fail_stop.contains(&c.spec.name) => {
                Err(ContainerError::CommandFailed {
                    command: "stop".into(),
                    stderr: "injected failure".into(),
                })
            }
            Some(c) => {
                c.running = false;
                Ok(())
            }
            None => Err(ContainerError::NotFound(container_id.to_string())),
        }
    }

    async fn remove_by_name(&self, name: &str) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.removed.push(name.to_string());
        inner.containers.remove(name);
        Ok(())
    }
}
