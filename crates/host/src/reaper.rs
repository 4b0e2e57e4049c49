// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle container reclamation.
//!
//! A background loop sweeps the registry and stops running agents whose
//! last activity is older than the idle timeout. One agent failing to
//! stop never aborts the sweep. Registry state survives the stop, so a
//! reaped agent restarts on its next dispatch.

use crate::host::{Host, HostError};
use ah_adapters::{ContainerRuntime, WorkerApi};
use ah_core::Clock;
use tokio_util::sync::CancellationToken;

impl<R, W, C> Host<R, W, C>
where
    R: ContainerRuntime,
    W: WorkerApi,
    C: Clock,
{
    /// One sweep: stop every running agent idle past the timeout.
    /// Returns how many agents were stopped.
    pub async fn reap_idle(&self) -> Result<usize, HostError> {
        let now = self.clock.epoch_ms();
        let idle_limit_ms = self.config.idle_timeout.as_millis() as u64;
        let mut reaped = 0;

        for (agent_id, record) in self.registry.load()? {
            if !record.is_running() || record.idle_ms(now) <= idle_limit_ms {
                continue;
            }
            tracing::info!(
                agent_id = %agent_id,
                idle_ms = record.idle_ms(now),
                "reaping idle agent"
            );
            match self.stop_agent(&agent_id).await {
                Ok(_) => reaped += 1,
                Err(e) => {
                    tracing::warn!(agent_id = %agent_id, error = %e, "idle reap failed")
                }
            }
        }
        Ok(reaped)
    }
}

/// Spawn the reaper loop. Sweeps every `reaper_interval` until the token
/// is cancelled.
pub fn spawn_reaper<R, W, C>(
    host: Host<R, W, C>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    R: ContainerRuntime,
    W: WorkerApi,
    C: Clock,
{
    tokio::spawn(async move {
        let interval = host.config().reaper_interval;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = host.reap_idle().await {
                        tracing::warn!(error = %e, "reaper sweep failed");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
