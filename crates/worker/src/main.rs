// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah-worker: the in-container control plane for one agent.
//!
//! Serves the worker HTTP API (`/health`, `/chat`, `/history`) on the
//! container port, funnels every chat turn through a single-consumer
//! queue so turns never interleave, persists completed turns to the
//! session store under `/data`, and shuts itself down after sitting idle
//! past its timeout.

mod config;
mod idle;
mod queue;
mod runner;
mod server;

use crate::config::WorkerConfig;
use crate::idle::IdleWatch;
use crate::queue::RequestQueue;
use crate::runner::CommandRunner;
use ah_storage::SessionStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    tracing::info!(agent_id = %config.agent_id, port = config.port, "worker starting");

    let session = Arc::new(Mutex::new(SessionStore::open(&config.data_dir)?));
    let runner = Arc::new(CommandRunner::from_config(&config)?);

    let (queue, consumer) = RequestQueue::new();
    let consumer_session = Arc::clone(&session);
    tokio::spawn(async move { consumer.run(runner, consumer_session).await });

    let shutdown = CancellationToken::new();
    let idle = IdleWatch::new(config.idle_timeout, shutdown.clone());
    idle.spawn();

    let state = server::AppState {
        agent_id: config.agent_id.clone(),
        queue,
        session,
        idle: idle.clone(),
    };
    let app = server::router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!(agent_id = %config.agent_id, "worker exiting");
    Ok(())
}
