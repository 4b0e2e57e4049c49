// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_send_with_instructions_file() {
    let cli = Cli::parse_from([
        "ah",
        "send",
        "reviewer",
        "look at this diff",
        "--instructions-file",
        "/tmp/prompt.txt",
    ]);
    let Command::Send { agent_id, message, instructions, instructions_file } = cli.command else {
        panic!("expected Send");
    };
    assert_eq!(agent_id, "reviewer");
    assert_eq!(message, "look at this diff");
    assert_eq!(instructions, None);
    assert_eq!(instructions_file, Some(PathBuf::from("/tmp/prompt.txt")));
}

#[test]
fn parse_history_flags() {
    let cli = Cli::parse_from(["ah", "history", "reviewer", "-n", "10", "--restart", "--no-tools"]);
    let Command::History { agent_id, count, restart, no_tools } = cli.command else {
        panic!("expected History");
    };
    assert_eq!(agent_id, "reviewer");
    assert_eq!(count, Some(10));
    assert!(restart);
    assert!(no_tools);
}

#[test]
fn parse_list_and_stop() {
    assert!(matches!(Cli::parse_from(["ah", "list"]).command, Command::List));
    let cli = Cli::parse_from(["ah", "stop", "reviewer"]);
    assert!(matches!(cli.command, Command::Stop { agent_id } if agent_id == "reviewer"));
}
