// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalization of raw stored messages into [`NormalizedMessage`].
//!
//! A raw message is `{"role": "user"|"assistant", "content": ...}` where
//! content is either a plain string or an array of blocks: text blocks,
//! `tool_use` invocations (assistant side), and `tool_result` blocks (user
//! side, referencing the invocation by `tool_use_id`). Tool invocations are
//! split out as separate `ToolUse` entries and results are matched back to
//! the invoking tool's name by their reference id.

use ah_core::{NormalizedMessage, Role};
use serde_json::Value;
use std::collections::HashMap;

const UNKNOWN_TOOL: &str = "unknown";

/// Normalize raw messages into the canonical transcript shape.
///
/// With `include_tool_messages` false, only plain user/assistant text
/// entries are produced.
pub fn normalize_messages(raw: &[Value], include_tool_messages: bool) -> Vec<NormalizedMessage> {
    let mut out = Vec::new();
    // tool_use id → tool name, for matching results back to invocations
    let mut tool_names: HashMap<String, String> = HashMap::new();

    for msg in raw {
        let role = msg.get("role").and_then(Value::as_str).unwrap_or_default();
        let content = msg.get("content").unwrap_or(&Value::Null);
        match role {
            "assistant" => normalize_assistant(content, include_tool_messages, &mut tool_names, &mut out),
            "user" => normalize_user(content, include_tool_messages, &tool_names, &mut out),
            _ => {}
        }
    }
    out
}

fn normalize_assistant(
    content: &Value,
    include_tools: bool,
    tool_names: &mut HashMap<String, String>,
    out: &mut Vec<NormalizedMessage>,
) {
    let text = extract_text(content);
    if !text.is_empty() {
        out.push(NormalizedMessage::assistant(text));
    }
    for block in content_blocks(content) {
        if block.get("type").and_then(Value::as_str) != Some("tool_use") {
            continue;
        }
        let name = block
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_TOOL)
            .to_string();
        if let Some(id) = block.get("id").and_then(Value::as_str) {
            tool_names.insert(id.to_string(), name.clone());
        }
        if include_tools {
            let input = block.get("input").cloned().unwrap_or(Value::Object(Default::default()));
            out.push(NormalizedMessage::tool_use(name, input));
        }
    }
}

fn normalize_user(
    content: &Value,
    include_tools: bool,
    tool_names: &HashMap<String, String>,
    out: &mut Vec<NormalizedMessage>,
) {
    let results: Vec<&Value> = content_blocks(content)
        .into_iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("tool_result"))
        .collect();

    if results.is_empty() {
        let text = extract_text(content);
        if !text.is_empty() {
            out.push(NormalizedMessage::user(text));
        }
        return;
    }

    if !include_tools {
        return;
    }
    for block in results {
        let name = block
            .get("tool_use_id")
            .and_then(Value::as_str)
            .and_then(|id| tool_names.get(id))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TOOL);
        let output = block.get("content").map(extract_text).unwrap_or_default();
        out.push(NormalizedMessage::tool_result(name, output));
    }
}

/// Extract joined text from string content or text blocks.
fn extract_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let texts: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .filter(|t| !t.trim().is_empty())
                .collect();
            texts.join("\n")
        }
        _ => String::new(),
    }
}

fn content_blocks(content: &Value) -> Vec<&Value> {
    match content {
        Value::Array(items) => items.iter().filter(|i| i.is_object()).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
