// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier.
//!
//! Agent ids are caller-supplied, opaque, and stable for the agent's lifetime
//! (e.g. "code-reviewer"). They are never generated by the orchestrator, so
//! unlike container ids there is no random component.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Caller-supplied unique key for a logical agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub SmolStr);

impl AgentId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Deterministic container name for an agent.
///
/// Lookups and removal by name must be idempotent, so the name is a pure
/// function of the agent id with no random component.
pub fn container_name(agent_id: &AgentId) -> String {
    format!("ah-agent-{}", agent_id)
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
