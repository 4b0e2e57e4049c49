// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah-adapters: boundaries between the orchestrator and the outside world.
//!
//! Two seams, each a trait with a production implementation and a fake:
//!
//! - [`ContainerRuntime`]: container lifecycle. [`DockerCli`] shells out to
//!   the `docker` binary; `FakeRuntime` keeps an in-memory container table.
//! - [`WorkerApi`]: the HTTP API every worker container exposes on its
//!   mapped port. [`HttpWorkerClient`] speaks HTTP/1.1 over a raw TCP stream;
//!   `FakeWorkerApi` scripts responses per port.
//!
//! Fakes are exported under `test-support` so downstream crates can drive
//! orchestration tests without Docker or a network.

pub mod container;
pub mod worker;

pub use container::{ContainerError, ContainerRuntime, ContainerSpec, DockerCli};
pub use worker::{ChatReply, HttpWorkerClient, WorkerApi, WorkerApiError, WorkerHealth};

#[cfg(any(test, feature = "test-support"))]
pub use container::FakeRuntime;
#[cfg(any(test, feature = "test-support"))]
pub use worker::FakeWorkerApi;
