// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn plain_messages_have_no_tool_fields() {
    let msg = NormalizedMessage::user("hello");
    assert_eq!(msg.role, Role::User);
    assert!(!msg.is_tool());
    let json = serde_json::to_string(&msg).unwrap();
    assert!(!json.contains("tool_name"));
    assert!(!json.contains("payload"));
}

#[test]
fn tool_use_carries_name_and_input() {
    let msg = NormalizedMessage::tool_use("shell", json!({"command": "ls"}));
    assert_eq!(msg.role, Role::ToolUse);
    assert!(msg.is_tool());
    assert_eq!(msg.tool_name.as_deref(), Some("shell"));
    assert_eq!(msg.payload, Some(json!({"command": "ls"})));
}

#[test]
fn tool_result_carries_output_text() {
    let msg = NormalizedMessage::tool_result("shell", "file.txt");
    assert_eq!(msg.role, Role::ToolResult);
    assert_eq!(msg.content, "file.txt");
    assert_eq!(msg.tool_name.as_deref(), Some("shell"));
}

#[test]
fn role_serde_is_snake_case() {
    assert_eq!(serde_json::to_string(&Role::ToolUse).unwrap(), "\"tool_use\"");
    let role: Role = serde_json::from_str("\"tool_result\"").unwrap();
    assert_eq!(role, Role::ToolResult);
}
