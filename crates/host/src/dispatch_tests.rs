// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::HostConfig;
use crate::host::HostError;
use ah_core::{AgentStatus, FakeClock};
use ah_adapters::{FakeRuntime, FakeWorkerApi};
use std::time::Duration;

struct Fixture {
    host: Host<FakeRuntime, FakeWorkerApi, FakeClock>,
    worker: FakeWorkerApi,
    clock: FakeClock,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = HostConfig::new(dir.path())
        .startup_timeout(Duration::from_millis(250))
        .health_poll_interval(Duration::from_millis(1));
    let worker = FakeWorkerApi::new();
    let clock = FakeClock::new();
    let host = Host::new(config, FakeRuntime::new(), worker.clone(), clock.clone());
    Fixture { host, worker, clock, _dir: dir }
}

fn id(s: &str) -> AgentId {
    AgentId::from(s)
}

#[tokio::test]
async fn send_starts_agent_and_acks_dispatched() {
    let f = fixture();
    f.worker.set_healthy(9000);

    let outcome = f.host.send_message(&id("a"), "hello", &EnsureOptions::new()).await.unwrap();
    assert_eq!(outcome.status, "dispatched");
    assert_eq!(outcome.agent_id, id("a"));
    assert_eq!(outcome.port, 9000);

    f.worker.wait_for_chats(1).await;
    assert_eq!(f.worker.chats(), vec![(9000, "hello".to_string())]);
}

#[tokio::test]
async fn activity_is_stamped_before_the_turn_completes() {
    let f = fixture();
    f.worker.set_healthy(9000);
    f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();

    f.clock.advance(Duration::from_secs(120));
    f.host.send_message(&id("a"), "hi", &EnsureOptions::new()).await.unwrap();

    // stamped synchronously at dispatch, not when the turn returns
    let record = f.host.registry().get(&id("a")).unwrap().unwrap();
    assert_eq!(record.last_activity_ms, 1_000_000 + 120_000);
}

#[tokio::test]
async fn failed_turn_does_not_fail_the_ack() {
    let f = fixture();
    f.worker.set_healthy(9000);
    f.worker.fail_chat(9000);

    let outcome = f.host.send_message(&id("a"), "boom", &EnsureOptions::new()).await.unwrap();
    assert_eq!(outcome.status, "dispatched");
    f.worker.wait_for_chats(1).await;

    // the agent stays usable
    let record = f.host.registry().get(&id("a")).unwrap().unwrap();
    assert_eq!(record.status, AgentStatus::Running);
}

#[tokio::test]
async fn send_surfaces_startup_failures() {
    let f = fixture();
    // worker never becomes healthy
    let err = f.host.send_message(&id("a"), "hello", &EnsureOptions::new()).await.unwrap_err();
    assert!(matches!(err, HostError::StartupTimeout { .. }));
    assert!(f.worker.chats().is_empty());
}

#[tokio::test]
async fn consecutive_sends_reuse_the_running_agent() {
    let f = fixture();
    f.worker.set_healthy(9000);
    f.host.send_message(&id("a"), "one", &EnsureOptions::new()).await.unwrap();
    f.host.send_message(&id("a"), "two", &EnsureOptions::new()).await.unwrap();

    f.worker.wait_for_chats(2).await;
    let messages: Vec<String> = f.worker.chats().into_iter().map(|(_, m)| m).collect();
    assert!(messages.contains(&"one".to_string()));
    assert!(messages.contains(&"two".to_string()));
}
