// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah: operator CLI for the agenthost orchestrator.
//!
//! Thin shell over [`ah_host::Host`]: parses arguments, runs one
//! operation against the Docker runtime, prints JSON.

use ah_adapters::{DockerCli, HttpWorkerClient};
use ah_core::{AgentId, SystemClock};
use ah_host::{EnsureOptions, HistoryOptions, Host};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ah", about = "Manage containerized agent workers", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dispatch a message to an agent, starting it if needed
    Send {
        agent_id: String,
        message: String,

        /// Inline custom instructions for a brand-new agent
        #[arg(long)]
        instructions: Option<String>,

        /// File with custom instructions (wins over --instructions)
        #[arg(long, value_name = "PATH")]
        instructions_file: Option<PathBuf>,
    },

    /// Print an agent's transcript
    History {
        agent_id: String,

        /// Only the last N entries
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Restart a stopped agent for a live view
        #[arg(long)]
        restart: bool,

        /// Leave out tool invocations and results
        #[arg(long)]
        no_tools: bool,
    },

    /// List all registered agents
    List,

    /// Stop an agent's container
    Stop { agent_id: String },

    /// Run the idle reaper until interrupted
    Reap,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = ah_host::env::host_config_from_env();
    let host = Host::new(config, DockerCli::new(), HttpWorkerClient::new(), SystemClock);

    match cli.command {
        Command::Send { agent_id, message, instructions, instructions_file } => {
            let mut opts = EnsureOptions::new();
            if let Some(text) = instructions {
                opts = opts.instructions(text);
            }
            if let Some(path) = instructions_file {
                opts = opts.instructions_file(path);
            }
            let outcome = host.send_message(&AgentId::from(agent_id), &message, &opts).await?;
            print_json(&outcome)?;
        }
        Command::History { agent_id, count, restart, no_tools } => {
            let mut opts = HistoryOptions::new()
                .auto_restart(restart)
                .include_tool_messages(!no_tools);
            if let Some(n) = count {
                opts = opts.count(n);
            }
            let response = host.get_messages(&AgentId::from(agent_id), &opts).await?;
            print_json(&response)?;
        }
        Command::List => {
            let agents = host.list_agents().await?;
            print_json(&agents)?;
        }
        Command::Stop { agent_id } => {
            let record = host.stop_agent(&AgentId::from(agent_id)).await?;
            print_json(&record)?;
        }
        Command::Reap => {
            let shutdown = tokio_util::sync::CancellationToken::new();
            let handle = ah_host::spawn_reaper(host, shutdown.clone());
            tokio::signal::ctrl_c().await?;
            shutdown.cancel();
            handle.await?;
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
