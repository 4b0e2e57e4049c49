// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget message dispatch.
//!
//! `send_message` guarantees the agent is running, stamps activity, then
//! hands the turn to a detached task and acks immediately. The worker's
//! own queue serializes concurrent turns, so the ack is always
//! `dispatched` and never reports a queue position.

use crate::host::{EnsureOptions, Host, HostError};
use ah_adapters::{ContainerRuntime, WorkerApi};
use ah_core::{AgentId, Clock};
use serde::Serialize;

/// Ack returned to the caller once a turn has been handed off.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub status: String,
    pub agent_id: AgentId,
    /// Host port the worker is listening on.
    pub port: u16,
}

impl<R, W, C> Host<R, W, C>
where
    R: ContainerRuntime,
    W: WorkerApi,
    C: Clock,
{
    /// Dispatch one chat turn to the agent, starting it if necessary.
    ///
    /// Activity is stamped before the turn is handed off, so the idle
    /// reaper never reclaims an agent whose turn is still in flight at
    /// dispatch time. The turn's outcome is logged, not returned.
    pub async fn send_message(
        &self,
        agent_id: &AgentId,
        message: &str,
        opts: &EnsureOptions,
    ) -> Result<SendOutcome, HostError> {
        let record = self.ensure_running(agent_id, opts).await?;

        let now = self.clock.epoch_ms();
        self.registry.update(agent_id, |r| r.touch(now))?;

        let worker = std::sync::Arc::clone(&self.worker);
        let port = record.port;
        let timeout = self.config.chat_timeout;
        let id = agent_id.clone();
        let body = message.to_string();
        tokio::spawn(async move {
            match worker.chat(port, &body, timeout).await {
                Ok(reply) => {
                    tracing::info!(agent_id = %id, status = %reply.status, "chat turn finished")
                }
                Err(e) => tracing::warn!(agent_id = %id, error = %e, "chat turn failed"),
            }
        });

        Ok(SendOutcome { status: "dispatched".into(), agent_id: agent_id.clone(), port })
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
