// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah-storage: durable state for the orchestrator and workers.
//!
//! Two stores live here:
//!
//! - [`Registry`]: the whole-file JSON map of `agent_id → AgentRecord`,
//!   the sole source of truth for what agents exist.
//! - [`session`]: the per-agent conversation store: a writer for the
//!   current per-message-file schema and a reader that reconciles both
//!   historical schemas into [`ah_core::NormalizedMessage`].

pub mod normalize;
pub mod registry;
pub mod session;

pub use normalize::normalize_messages;
pub use registry::{Registry, RegistryError};
pub use session::{has_session, read_raw_messages, SessionStore, SessionStoreError};
