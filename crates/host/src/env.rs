// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable overrides for [`HostConfig`].
//!
//! Every knob has an `AH_`-prefixed variable; unset or unparseable values
//! fall back to the built-in defaults.

use crate::config::HostConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_STATE_DIR: &str = "AH_STATE_DIR";
pub const ENV_BASE_PORT: &str = "AH_BASE_PORT";
pub const ENV_WORKER_IMAGE: &str = "AH_WORKER_IMAGE";
pub const ENV_NETWORK: &str = "AH_NETWORK";
pub const ENV_IDLE_TIMEOUT_MINUTES: &str = "AH_IDLE_TIMEOUT_MINUTES";
pub const ENV_STARTUP_TIMEOUT_SECS: &str = "AH_STARTUP_TIMEOUT_SECS";
pub const ENV_CHAT_TIMEOUT_SECS: &str = "AH_CHAT_TIMEOUT_SECS";
pub const ENV_REAPER_INTERVAL_SECS: &str = "AH_REAPER_INTERVAL_SECS";

const DEFAULT_STATE_DIR: &str = "data";

/// Build a [`HostConfig`] from the process environment.
pub fn host_config_from_env() -> HostConfig {
    let state_dir =
        std::env::var(ENV_STATE_DIR).map(PathBuf::from).unwrap_or_else(|_| DEFAULT_STATE_DIR.into());
    let mut config = HostConfig::new(state_dir);

    if let Some(port) = var_parsed::<u16>(ENV_BASE_PORT) {
        config = config.base_port(port);
    }
    if let Ok(image) = std::env::var(ENV_WORKER_IMAGE) {
        config = config.worker_image(image);
    }
    if let Ok(network) = std::env::var(ENV_NETWORK) {
        config = config.network(network);
    }
    if let Some(minutes) = var_parsed::<u64>(ENV_IDLE_TIMEOUT_MINUTES) {
        config = config.idle_timeout(Duration::from_secs(minutes * 60));
    }
    if let Some(secs) = var_parsed::<u64>(ENV_STARTUP_TIMEOUT_SECS) {
        config = config.startup_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = var_parsed::<u64>(ENV_CHAT_TIMEOUT_SECS) {
        config = config.chat_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = var_parsed::<u64>(ENV_REAPER_INTERVAL_SECS) {
        config = config.reaper_interval(Duration::from_secs(secs));
    }
    config
}

fn var_parsed<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
