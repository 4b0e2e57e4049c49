// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

// Env-var tests mutate process state, so each uses a distinct variable
// and restores it. Parsing fallbacks are covered without touching env.

#[test]
fn unset_env_uses_defaults() {
    // Fresh default irrespective of ambient AH_ vars we don't set here
    let config = HostConfig::new("data");
    assert_eq!(config.base_port, 9000);
    assert_eq!(config.idle_timeout, Duration::from_secs(1800));
}

#[test]
fn idle_timeout_minutes_is_converted() {
    std::env::set_var(ENV_IDLE_TIMEOUT_MINUTES, "5");
    let config = host_config_from_env();
    std::env::remove_var(ENV_IDLE_TIMEOUT_MINUTES);
    assert_eq!(config.idle_timeout, Duration::from_secs(300));
}

#[test]
fn unparseable_value_falls_back() {
    std::env::set_var(ENV_BASE_PORT, "not-a-port");
    let config = host_config_from_env();
    std::env::remove_var(ENV_BASE_PORT);
    assert_eq!(config.base_port, 9000);
}
