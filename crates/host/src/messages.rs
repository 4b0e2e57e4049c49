// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transcript retrieval.
//!
//! Prefers the worker's live `/history`; for stopped agents either
//! restarts on request or reads the persisted session from disk and
//! normalizes it to the same shape.

use crate::host::{EnsureOptions, Host, HostError};
use ah_adapters::{ContainerRuntime, WorkerApi};
use ah_core::{AgentId, AgentStatus, Clock, NormalizedMessage};
use serde::Serialize;

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    Live,
    Disk,
}

ah_core::simple_display! {
    TranscriptSource {
        Live => "live",
        Disk => "disk",
    }
}

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Keep only the last `count` entries.
    pub count: Option<usize>,
    /// Restart a stopped agent and query it live instead of reading disk.
    pub auto_restart: bool,
    /// Include tool invocation/result entries.
    pub include_tool_messages: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryOptions {
    pub fn new() -> Self {
        Self { count: None, auto_restart: false, include_tool_messages: true }
    }

    ah_core::setters! {
        set {
            auto_restart: bool,
            include_tool_messages: bool,
        }
        option {
            count: usize,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub agent_id: AgentId,
    pub messages: Vec<NormalizedMessage>,
    pub container_status: AgentStatus,
    pub source: TranscriptSource,
    /// True when the transcript came from disk because the container is
    /// down, so a restart would give the caller a live view. Stays false
    /// when a running worker merely failed one history call.
    pub restart_hint: bool,
}

impl<R, W, C> Host<R, W, C>
where
    R: ContainerRuntime,
    W: WorkerApi,
    C: Clock,
{
    /// Fetch an agent's transcript, live when possible.
    pub async fn get_messages(
        &self,
        agent_id: &AgentId,
        opts: &HistoryOptions,
    ) -> Result<MessagesResponse, HostError> {
        let mut record = self
            .registry
            .get(agent_id)?
            .ok_or_else(|| HostError::UnknownAgent(agent_id.clone()))?;

        let live = match record.container_id {
            Some(ref cid) if record.is_running() => self.runtime.is_running(cid).await,
            _ => false,
        };
        if record.is_running() && !live {
            if let Some(updated) =
                self.registry.update(agent_id, |r| r.status = AgentStatus::Stopped)?
            {
                record = updated;
            }
        }

        if live {
            match self.fetch_live(agent_id, record.port, opts).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        agent_id = %agent_id,
                        error = %e,
                        "live history failed, falling back to disk"
                    );
                    // Container is still up, so a restart would not help
                    return self.read_from_disk(agent_id, &record, opts, false);
                }
            }
        }
        if opts.auto_restart {
            let record = self.ensure_running(agent_id, &EnsureOptions::new()).await?;
            return self.fetch_live(agent_id, record.port, opts).await;
        }

        self.read_from_disk(agent_id, &record, opts, true)
    }

    async fn fetch_live(
        &self,
        agent_id: &AgentId,
        port: u16,
        opts: &HistoryOptions,
    ) -> Result<MessagesResponse, HostError> {
        let messages =
            self.worker.history(port, opts.count, opts.include_tool_messages).await?;
        Ok(MessagesResponse {
            agent_id: agent_id.clone(),
            messages,
            container_status: AgentStatus::Running,
            source: TranscriptSource::Live,
            restart_hint: false,
        })
    }

    fn read_from_disk(
        &self,
        agent_id: &AgentId,
        record: &ah_core::AgentRecord,
        opts: &HistoryOptions,
        restart_hint: bool,
    ) -> Result<MessagesResponse, HostError> {
        let data_dir = self.data_dir(record);
        let raw = ah_storage::read_raw_messages(&data_dir);
        let mut messages = ah_storage::normalize_messages(&raw, opts.include_tool_messages);
        if let Some(count) = opts.count {
            if count < messages.len() {
                messages.drain(..messages.len() - count);
            }
        }
        Ok(MessagesResponse {
            agent_id: agent_id.clone(),
            messages,
            container_status: record.status,
            source: TranscriptSource::Disk,
            restart_hint,
        })
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
