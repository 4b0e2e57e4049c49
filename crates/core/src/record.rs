// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry record for a managed agent.
//!
//! One `AgentRecord` exists per agent id and is the registry's unit of truth.
//! The lifecycle controller mutates the container fields and status; the
//! dispatcher bumps `last_activity_ms`. Records are never deleted
//! automatically: a stopped agent keeps its record so a later restart can
//! reuse the same port and data directory.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A managed agent as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Caller-supplied unique key, stable for the agent's lifetime.
    pub agent_id: AgentId,
    /// Id of the currently backing container, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Deterministic container name derived from the agent id.
    pub container_name: String,
    /// Host port bound to the worker's control-plane API. Allocated once
    /// per agent and reused across restarts.
    pub port: u16,
    /// Current lifecycle status.
    pub status: AgentStatus,
    /// Epoch milliseconds when the record was created.
    pub created_at_ms: u64,
    /// Epoch milliseconds of last dispatch or lifecycle activity.
    /// Monotonically non-decreasing; drives idle reclamation.
    pub last_activity_ms: u64,
    /// Optional override of the on-disk storage root for this agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl AgentRecord {
    pub fn new(agent_id: AgentId, port: u16, now_ms: u64) -> Self {
        let container_name = crate::agent::container_name(&agent_id);
        Self {
            agent_id,
            container_id: None,
            container_name,
            port,
            status: AgentStatus::Starting,
            created_at_ms: now_ms,
            last_activity_ms: now_ms,
            data_dir: None,
        }
    }

    /// Bump `last_activity_ms`, keeping it monotonically non-decreasing.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity_ms = self.last_activity_ms.max(now_ms);
    }

    /// Milliseconds since the last recorded activity.
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms)
    }

    pub fn is_running(&self) -> bool {
        self.status == AgentStatus::Running
    }
}

/// Lifecycle status of an agent.
///
/// Transitions: `Starting → Running` (health check passed),
/// `Running → Stopped` (explicit stop, idle reap, or crash detected),
/// `Stopped → Starting` (restart), any create/start failure → `Error`.
/// `Error` is not terminal: a later dispatch retries creation from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Starting,
    Running,
    Stopped,
    Error,
}

crate::simple_display! {
    AgentStatus {
        Starting => "starting",
        Running => "running",
        Stopped => "stopped",
        Error => "error",
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
