// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-file persisted agent registry.
//!
//! Every read loads and parses the entire file; every write serializes the
//! entire map to a temp file in the same directory and renames it over the
//! target, so a crash mid-write never leaves a torn file. Read-modify-write
//! sequences are guarded by an in-process mutex: the registry assumes a
//! single orchestrator process (no cross-process lock).

use ah_core::{AgentId, AgentRecord};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse registry {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable `agent_id → AgentRecord` mapping.
#[derive(Clone)]
pub struct Registry {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Arc<Mutex<()>>,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load the full registry. A missing file is an empty registry.
    pub fn load(&self) -> Result<BTreeMap<AgentId, AgentRecord>, RegistryError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|source| RegistryError::Read { path: self.path.clone(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| RegistryError::Parse { path: self.path.clone(), source })
    }

    /// Look up a single record.
    pub fn get(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, RegistryError> {
        Ok(self.load()?.remove(agent_id.as_str()))
    }

    /// Insert or replace a record.
    pub fn upsert(&self, record: AgentRecord) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        let mut agents = self.load()?;
        agents.insert(record.agent_id.clone(), record);
        self.save(&agents)
    }

    /// Apply a mutation to an existing record and persist the result.
    ///
    /// Returns the updated record, or `None` if no record exists.
    pub fn update<F>(&self, agent_id: &AgentId, f: F) -> Result<Option<AgentRecord>, RegistryError>
    where
        F: FnOnce(&mut AgentRecord),
    {
        let _guard = self.write_lock.lock();
        let mut agents = self.load()?;
        let Some(record) = agents.get_mut(agent_id.as_str()) else {
            return Ok(None);
        };
        f(record);
        let updated = record.clone();
        self.save(&agents)?;
        Ok(Some(updated))
    }

    /// Remove a record. Removing an unknown id is a no-op.
    pub fn remove(&self, agent_id: &AgentId) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        let mut agents = self.load()?;
        if agents.remove(agent_id.as_str()).is_some() {
            self.save(&agents)?;
        }
        Ok(())
    }

    /// Ports currently held by any registered agent.
    pub fn ports_in_use(&self) -> Result<std::collections::BTreeSet<u16>, RegistryError> {
        Ok(self.load()?.values().map(|r| r.port).collect())
    }

    fn save(&self, agents: &BTreeMap<AgentId, AgentRecord>) -> Result<(), RegistryError> {
        let write = |s: &str| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let tmp = self.path.with_extension("json.tmp");
            std::fs::write(&tmp, s)?;
            std::fs::rename(&tmp, &self.path)
        };
        let body = serde_json::to_string_pretty(agents)
            .map_err(|source| RegistryError::Write {
                path: self.path.clone(),
                source: std::io::Error::other(source),
            })?;
        write(&body).map_err(|source| RegistryError::Write { path: self.path.clone(), source })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
