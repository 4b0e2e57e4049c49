// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah-host: the orchestrator.
//!
//! [`Host`] owns the agent registry and drives worker containers through the
//! [`ah_adapters`] seams: starting them on demand, dispatching chat turns
//! fire-and-forget, reading transcripts live or from disk, and reclaiming
//! idle containers via the background reaper.

pub mod config;
pub mod dispatch;
pub mod env;
pub mod host;
pub mod messages;
pub mod reaper;

pub use config::HostConfig;
pub use dispatch::SendOutcome;
pub use host::{AgentSummary, EnsureOptions, Host, HostError};
pub use messages::{HistoryOptions, MessagesResponse, TranscriptSource};
pub use reaper::spawn_reaper;
