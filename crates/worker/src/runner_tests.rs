// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::WorkerConfig;

fn config_in(dir: &tempfile::TempDir, cmd: &str) -> WorkerConfig {
    WorkerConfig {
        agent_id: "test".into(),
        data_dir: dir.path().to_path_buf(),
        port: 8080,
        idle_timeout: None,
        custom_instructions: false,
        agent_cmd: cmd.split_whitespace().map(str::to_string).collect(),
    }
}

#[tokio::test]
async fn command_runner_pipes_message_through_the_agent_command() {
    let dir = tempfile::tempdir().unwrap();
    let runner = CommandRunner::from_config(&config_in(&dir, "cat")).unwrap();
    let response = runner.run_turn("hello agent").await.unwrap();
    assert_eq!(response, "hello agent");
}

#[tokio::test]
async fn failing_command_surfaces_as_turn_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = CommandRunner::from_config(&config_in(&dir, "false")).unwrap();
    assert!(matches!(runner.run_turn("hi").await, Err(TurnError::Command(_))));
}

#[test]
fn instructions_flag_without_a_readable_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, "cat");
    config.custom_instructions = true;
    assert!(matches!(
        CommandRunner::from_config(&config),
        Err(ConfigError::Instructions { .. })
    ));

    std::fs::write(config.instructions_path(), "   \n").unwrap();
    assert!(matches!(
        CommandRunner::from_config(&config),
        Err(ConfigError::Instructions { .. })
    ));

    std::fs::write(config.instructions_path(), "be helpful").unwrap();
    assert!(CommandRunner::from_config(&config).is_ok());
}

#[tokio::test]
async fn scripted_runner_echoes_by_default() {
    let runner = ScriptedRunner::new();
    assert_eq!(runner.run_turn("ping").await.unwrap(), "echo: ping");
    assert_eq!(*runner.turns.lock(), vec!["ping"]);
}
