// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The boundary to the actual agent runtime.
//!
//! The worker owns queuing, persistence, and HTTP; everything about how a
//! turn is reasoned over lives behind [`TurnRunner`]. The production
//! implementation shells out to the agent command baked into the image,
//! passing the message on stdin and reading the reply from stdout.

use crate::config::{ConfigError, WorkerConfig};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("agent command failed: {0}")]
    Command(String),
    #[error("failed to exec agent command: {0}")]
    Exec(#[from] std::io::Error),
    #[error("worker is shutting down")]
    Shutdown,
}

/// Executes one conversation turn.
#[async_trait]
pub trait TurnRunner: Send + Sync + 'static {
    async fn run_turn(&self, message: &str) -> Result<String, TurnError>;
}

/// Runs the agent command as a subprocess per turn.
///
/// The command receives the instructions path, the tools directory, and
/// the message on stdin; its stdout is the turn's response.
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    instructions: Option<PathBuf>,
    tools_dir: PathBuf,
}

impl CommandRunner {
    pub fn from_config(config: &WorkerConfig) -> Result<Self, ConfigError> {
        let mut cmd = config.agent_cmd.iter();
        let program = cmd.next().cloned().unwrap_or_else(|| "agent".to_string());
        let args: Vec<String> = cmd.cloned().collect();

        let instructions = if config.custom_instructions {
            let path = config.instructions_path();
            let readable = std::fs::read_to_string(&path)
                .map(|t| !t.trim().is_empty())
                .unwrap_or(false);
            if !readable {
                return Err(ConfigError::Instructions { path });
            }
            Some(path)
        } else {
            None
        };

        Ok(Self { program, args, instructions, tools_dir: config.tools_dir() })
    }
}

#[async_trait]
impl TurnRunner for CommandRunner {
    async fn run_turn(&self, message: &str) -> Result<String, TurnError> {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(ref path) = self.instructions {
            command.arg("--instructions").arg(path);
        }
        if self.tools_dir.is_dir() {
            command.arg("--tools-dir").arg(&self.tools_dir);
        }
        command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = command.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).await?;
            drop(stdin);
        }
        let output = child.wait_with_output().await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TurnError::Command(stderr.trim().to_string()))
        }
    }
}

/// Scripted runner for tests: fixed replies, injectable failures, and an
/// optional per-turn delay to hold the queue busy.
#[cfg(test)]
pub struct ScriptedRunner {
    replies: parking_lot::Mutex<std::collections::VecDeque<Result<String, String>>>,
    delay: std::time::Duration,
    pub turns: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            replies: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            delay: std::time::Duration::ZERO,
            turns: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, error: &str) {
        self.replies.lock().push_back(Err(error.to_string()));
    }
}

#[cfg(test)]
#[async_trait]
impl TurnRunner for ScriptedRunner {
    async fn run_turn(&self, message: &str) -> Result<String, TurnError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.turns.lock().push(message.to_string());
        match self.replies.lock().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(error)) => Err(TurnError::Command(error)),
            None => Ok(format!("echo: {}", message)),
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
