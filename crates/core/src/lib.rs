// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah-core: domain types shared by the agenthost orchestrator and worker.

pub mod macros;

pub mod agent;
pub mod clock;
pub mod message;
pub mod record;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{container_name, AgentId};
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
pub use message::{NormalizedMessage, Role};
pub use record::{AgentRecord, AgentStatus};
