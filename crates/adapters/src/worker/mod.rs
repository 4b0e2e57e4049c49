// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker HTTP API seam.
//!
//! Every worker container serves the same three endpoints on its mapped
//! host port: `GET /health`, `POST /chat`, `GET /history`. [`WorkerApi`]
//! abstracts that surface so orchestration logic can be exercised against
//! `FakeWorkerApi` without a network.

mod http;
#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use http::HttpWorkerClient;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWorkerApi;

use ah_core::NormalizedMessage;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Payload of a worker's `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerHealth {
    pub status: String,
    /// True while the worker is executing a turn.
    #[serde(default)]
    pub processing: bool,
    /// Requests waiting behind the current turn.
    #[serde(default)]
    pub queue_depth: u64,
}

/// Payload of a worker's `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub status: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub agent_id: String,
}

#[derive(Debug, Error)]
pub enum WorkerApiError {
    #[error("worker request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connect to {addr} failed: {source}")]
    Connect { addr: String, source: std::io::Error },
    #[error("worker io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid worker response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client side of the worker HTTP API, addressed by host port.
#[async_trait]
pub trait WorkerApi: Send + Sync + 'static {
    async fn health(&self, port: u16) -> Result<WorkerHealth, WorkerApiError>;

    /// Submit one chat turn and wait for the worker's reply. Turns can run
    /// for minutes, so the caller supplies the timeout.
    async fn chat(
        &self,
        port: u16,
        message: &str,
        timeout: Duration,
    ) -> Result<ChatReply, WorkerApiError>;

    /// Fetch the worker's live transcript. Tool entries are dropped before
    /// `count` is applied, so the last `count` entries are counted over the
    /// filtered transcript.
    async fn history(
        &self,
        port: u16,
        count: Option<usize>,
        include_tools: bool,
    ) -> Result<Vec<NormalizedMessage>, WorkerApiError>;
}
