// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-side idle self-shutdown.
//!
//! The orchestrator's reaper is the primary idle control; this is the
//! worker's own backstop for when the orchestrator dies or loses track
//! of the container. Every incoming request stamps activity, and a
//! watchdog cancels the server's shutdown token once the idle threshold
//! passes.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const WATCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct IdleWatch {
    last_activity: Arc<Mutex<Instant>>,
    timeout: Option<Duration>,
    shutdown: CancellationToken,
}

impl IdleWatch {
    pub fn new(timeout: Option<Duration>, shutdown: CancellationToken) -> Self {
        Self { last_activity: Arc::new(Mutex::new(Instant::now())), timeout, shutdown }
    }

    /// Record that a request just arrived.
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Start the watchdog. Without a timeout this is a no-op.
    pub fn spawn(&self) {
        let Some(timeout) = self.timeout else {
            return;
        };
        let watch = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = watch.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(WATCH_INTERVAL.min(timeout)) => {
                        if watch.idle_for() > timeout {
                            tracing::info!(
                                idle_secs = watch.idle_for().as_secs(),
                                "idle timeout reached, shutting down"
                            );
                            watch.shutdown.cancel();
                            break;
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod tests;
