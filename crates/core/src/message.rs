// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized transcript messages.
//!
//! Both the live-query path (worker `/history`) and the disk-read path
//! (persisted session stores) produce this shape, so callers see one
//! transcript format regardless of source.

use serde::{Deserialize, Serialize};

/// Role of a normalized transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    ToolUse,
    ToolResult,
}

crate::simple_display! {
    Role {
        User => "user",
        Assistant => "assistant",
        ToolUse => "tool_use",
        ToolResult => "tool_result",
    }
}

/// One reconstructed transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub role: Role,
    /// Textual content. For tool entries this is the extracted output (or
    /// empty for a tool invocation with no textual part).
    pub content: String,
    /// Tool name, present on `ToolUse` and `ToolResult` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Structured payload (tool input or raw result block).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl NormalizedMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), tool_name: None, payload: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), tool_name: None, payload: None }
    }

    pub fn tool_use(tool_name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            role: Role::ToolUse,
            content: String::new(),
            tool_name: Some(tool_name.into()),
            payload: Some(payload),
        }
    }

    pub fn tool_result(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            role: Role::ToolResult,
            content: output.into(),
            tool_name: Some(tool_name.into()),
            payload: None,
        }
    }

    /// True for tool-shaped entries, which are filtered out when callers
    /// ask for plain user/assistant text only.
    pub fn is_tool(&self) -> bool {
        matches!(self.role, Role::ToolUse | Role::ToolResult)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
