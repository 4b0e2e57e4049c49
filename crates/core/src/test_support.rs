// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders shared by other crates' tests.

use crate::{AgentId, AgentRecord, AgentStatus};
use std::path::PathBuf;

/// Builder for `AgentRecord` with test defaults.
pub struct AgentRecordBuilder {
    agent_id: AgentId,
    container_id: Option<String>,
    port: u16,
    status: AgentStatus,
    created_at_ms: u64,
    last_activity_ms: u64,
    data_dir: Option<PathBuf>,
}

impl Default for AgentRecordBuilder {
    fn default() -> Self {
        Self {
            agent_id: AgentId::new("test-agent"),
            container_id: None,
            port: 9000,
            status: AgentStatus::Stopped,
            created_at_ms: 1_000_000,
            last_activity_ms: 1_000_000,
            data_dir: None,
        }
    }
}

impl AgentRecordBuilder {
    pub fn agent_id(mut self, id: impl Into<AgentId>) -> Self {
        self.agent_id = id.into();
        self
    }

    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = Some(id.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn last_activity_ms(mut self, ms: u64) -> Self {
        self.last_activity_ms = ms;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> AgentRecord {
        let container_name = crate::agent::container_name(&self.agent_id);
        AgentRecord {
            agent_id: self.agent_id,
            container_id: self.container_id,
            container_name,
            port: self.port,
            status: self.status,
            created_at_ms: self.created_at_ms,
            last_activity_ms: self.last_activity_ms,
            data_dir: self.data_dir,
        }
    }
}

impl AgentRecord {
    /// Create a builder with test defaults.
    pub fn builder() -> AgentRecordBuilder {
        AgentRecordBuilder::default()
    }
}
