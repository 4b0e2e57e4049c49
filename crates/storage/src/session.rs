// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk conversation store for one agent.
//!
//! Two schemas exist in the wild:
//!
//! 1. **Per-message files** (current, written by [`SessionStore`]):
//!    `{data_dir}/.agent/session/messages/message_{N}.json`, each file
//!    `{"message_id": N, "message": {...}}` with a monotonic index.
//! 2. **Flat session file** (legacy): `{data_dir}/session.json` with the
//!    raw messages in a top-level `"messages"` array.
//!
//! [`read_raw_messages`] reconciles both so history survives workers that
//! wrote either layout. A corrupt individual message file is skipped with
//! a warning rather than making the rest of the history unavailable.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the session store writer.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("failed to create session dir {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to persist message {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory holding per-message files for an agent data dir.
pub fn messages_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(".agent").join("session").join("messages")
}

/// Legacy flat session file for an agent data dir.
pub fn legacy_session_file(data_dir: &Path) -> PathBuf {
    data_dir.join("session.json")
}

/// True if the agent has any persisted conversation in either schema.
pub fn has_session(data_dir: &Path) -> bool {
    if !indexed_message_files(&messages_dir(data_dir)).is_empty() {
        return true;
    }
    legacy_session_file(data_dir).exists()
}

/// Read raw message values from whichever schema is present on disk.
///
/// Read failures are logged and degrade to "no messages available";
/// a corrupt store must not fail a history fetch.
pub fn read_raw_messages(data_dir: &Path) -> Vec<Value> {
    let dir = messages_dir(data_dir);
    let indexed = indexed_message_files(&dir);
    if !indexed.is_empty() {
        let mut messages = Vec::with_capacity(indexed.len());
        for (index, path) in indexed {
            match read_wrapped_message(&path) {
                Some(msg) => messages.push(msg),
                None => {
                    tracing::warn!(path = %path.display(), index, "skipping unreadable message file");
                }
            }
        }
        return messages;
    }

    let legacy = legacy_session_file(data_dir);
    if !legacy.exists() {
        return Vec::new();
    }
    match std::fs::read_to_string(&legacy)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
    {
        Some(doc) => doc
            .get("messages")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        None => {
            tracing::warn!(path = %legacy.display(), "failed to read legacy session file");
            Vec::new()
        }
    }
}

/// Message files in a session dir, sorted by their monotonic index.
fn indexed_message_files(dir: &Path) -> Vec<(u64, PathBuf)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<(u64, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            let index = path
                .file_stem()?
                .to_str()?
                .strip_prefix("message_")?
                .parse::<u64>()
                .ok()?;
            Some((index, path))
        })
        .collect();
    files.sort_by_key(|(index, _)| *index);
    files
}

/// Parse one per-message file, unwrapping the nested `"message"` field.
fn read_wrapped_message(path: &Path) -> Option<Value> {
    let raw = std::fs::read_to_string(path).ok()?;
    let doc: Value = serde_json::from_str(&raw).ok()?;
    match doc.get("message") {
        Some(inner) => Some(inner.clone()),
        // Tolerate bare messages written without the wrapper
        None if doc.is_object() => Some(doc),
        None => None,
    }
}

/// Append-only writer for the per-message-file schema.
///
/// Used by the worker; one store per agent data directory. Indexes are
/// monotonic and recovered from disk on open, so restarts keep appending
/// where the previous process left off.
pub struct SessionStore {
    dir: PathBuf,
    next_index: u64,
}

impl SessionStore {
    /// Open (creating if needed) the message store under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, SessionStoreError> {
        let dir = messages_dir(data_dir);
        std::fs::create_dir_all(&dir)
            .map_err(|source| SessionStoreError::Create { path: dir.clone(), source })?;
        let next_index = indexed_message_files(&dir)
            .last()
            .map(|(index, _)| index + 1)
            .unwrap_or(0);
        Ok(Self { dir, next_index })
    }

    /// Persist one raw message, returning its assigned index.
    pub fn append(&mut self, message: &Value) -> Result<u64, SessionStoreError> {
        let index = self.next_index;
        let path = self.dir.join(format!("message_{}.json", index));
        let doc = serde_json::json!({ "message_id": index, "message": message });
        let body = serde_json::to_string_pretty(&doc)
            .map_err(|source| SessionStoreError::Persist {
                path: path.clone(),
                source: std::io::Error::other(source),
            })?;
        std::fs::write(&path, body)
            .map_err(|source| SessionStoreError::Persist { path: path.clone(), source })?;
        self.next_index = index + 1;
        Ok(index)
    }

    /// All raw messages currently persisted, in index order.
    pub fn load_raw(&self) -> Vec<Value> {
        indexed_message_files(&self.dir)
            .iter()
            .filter_map(|(_, path)| read_wrapped_message(path))
            .collect()
    }

    pub fn len(&self) -> u64 {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
