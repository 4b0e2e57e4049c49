// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable worker API for tests.

use super::{ChatReply, WorkerApi, WorkerApiError, WorkerHealth};
use ah_core::NormalizedMessage;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Inner {
    healthy: HashSet<u16>,
    /// Remaining health calls per port before the port reports healthy.
    healthy_after: HashMap<u16, u32>,
    processing: HashSet<u16>,
    history: HashMap<u16, Vec<NormalizedMessage>>,
    chat_fails: HashSet<u16>,
    chats: Vec<(u16, String)>,
    health_calls: HashMap<u16, u32>,
}

/// [`WorkerApi`] with per-port scripted behavior.
///
/// Ports are unhealthy until marked otherwise; `set_healthy_after` drives
/// startup-polling tests, `chats()` records every dispatched message.
#[derive(Clone, Default)]
pub struct FakeWorkerApi {
    inner: Arc<Mutex<Inner>>,
}

impl FakeWorkerApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, port: u16) {
        self.inner.lock().healthy.insert(port);
    }

    pub fn set_unhealthy(&self, port: u16) {
        let mut inner = self.inner.lock();
        inner.healthy.remove(&port);
        inner.healthy_after.remove(&port);
    }

    /// Port becomes healthy after `calls` failed health probes.
    pub fn set_healthy_after(&self, port: u16, calls: u32) {
        self.inner.lock().healthy_after.insert(port, calls);
    }

    pub fn set_processing(&self, port: u16, processing: bool) {
        let mut inner = self.inner.lock();
        if processing {
            inner.processing.insert(port);
        } else {
            inner.processing.remove(&port);
        }
    }

    pub fn set_history(&self, port: u16, messages: Vec<NormalizedMessage>) {
        self.inner.lock().history.insert(port, messages);
    }

    pub fn fail_chat(&self, port: u16) {
        self.inner.lock().chat_fails.insert(port);
    }

    /// Every `(port, message)` passed to `chat`, in call order.
    pub fn chats(&self) -> Vec<(u16, String)> {
        self.inner.lock().chats.clone()
    }

    pub fn health_calls(&self, port: u16) -> u32 {
        self.inner.lock().health_calls.get(&port).copied().unwrap_or(0)
    }

    /// Poll until `chat` has been called `n` times (bounded). Dispatch is
    /// detached, so tests wait on the recorded calls rather than a return
    /// value; assertions on `chats()` catch a wait that ran out.
    pub async fn wait_for_chats(&self, n: usize) {
        for _ in 0..500 {
            if self.inner.lock().chats.len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        tracing::warn!(expected = n, "gave up waiting for chat calls");
    }
}

fn refused(addr: String) -> WorkerApiError {
    WorkerApiError::Connect {
        addr,
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    }
}

#[async_trait]
impl WorkerApi for FakeWorkerApi {
    async fn health(&self, port: u16) -> Result<WorkerHealth, WorkerApiError> {
        let mut inner = self.inner.lock();
        *inner.health_calls.entry(port).or_insert(0) += 1;
        if let Some(remaining) = inner.healthy_after.get_mut(&port) {
            if *remaining == 0 {
                inner.healthy.insert(port);
                inner.healthy_after.remove(&port);
            } else {
                *remaining -= 1;
                return Err(refused(format!("127.0.0.1:{}", port)));
            }
        }
        if !inner.healthy.contains(&port) {
            return Err(refused(format!("127.0.0.1:{}", port)));
        }
        Ok(WorkerHealth {
            status: "healthy".into(),
            processing: inner.processing.contains(&port),
            queue_depth: 0,
        })
    }

    async fn chat(
        &self,
        port: u16,
        message: &str,
        _timeout: Duration,
    ) -> Result<ChatReply, WorkerApiError> {
        let mut inner = self.inner.lock();
        inner.chats.push((port, message.to_string()));
        if inner.chat_fails.contains(&port) {
            return Err(WorkerApiError::Status { status: 500, body: "injected failure".into() });
        }
        Ok(ChatReply {
            status: "success".into(),
            response: format!("echo: {}", message),
            agent_id: String::new(),
        })
    }

    async fn history(
        &self,
        port: u16,
        count: Option<usize>,
        include_tools: bool,
    ) -> Result<Vec<NormalizedMessage>, WorkerApiError> {
        let inner = self.inner.lock();
        if !inner.healthy.contains(&port) {
            return Err(refused(format!("127.0.0.1:{}", port)));
        }
        let mut messages = inner.history.get(&port).cloned().unwrap_or_default();
        if !include_tools {
            messages.retain(|m| !m.is_tool());
        }
        if let Some(n) = count {
            if n < messages.len() {
                messages.drain(..messages.len() - n);
            }
        }
        Ok(messages)
    }
}
