// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::HostConfig;
use ah_core::FakeClock;
use ah_adapters::{FakeRuntime, FakeWorkerApi};
use std::time::Duration;

struct Fixture {
    host: Host<FakeRuntime, FakeWorkerApi, FakeClock>,
    runtime: FakeRuntime,
    worker: FakeWorkerApi,
    clock: FakeClock,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = HostConfig::new(dir.path())
        .startup_timeout(Duration::from_millis(250))
        .health_poll_interval(Duration::from_millis(1));
    let runtime = FakeRuntime::new();
    let worker = FakeWorkerApi::new();
    let clock = FakeClock::new();
    let host = Host::new(config, runtime.clone(), worker.clone(), clock.clone());
    Fixture { host, runtime, worker, clock, _dir: dir }
}

fn id(s: &str) -> AgentId {
    AgentId::from(s)
}

#[tokio::test]
async fn first_ensure_creates_record_and_container() {
    let f = fixture();
    f.worker.set_healthy(9000);

    let record = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    assert_eq!(record.status, AgentStatus::Running);
    assert_eq!(record.port, 9000);
    assert_eq!(record.container_name, "ah-agent-a");
    assert!(record.container_id.is_some());
    assert_eq!(f.runtime.running_names(), vec!["ah-agent-a"]);

    // data dir scaffolding exists
    let data_dir = f.host.data_dir(&record);
    assert!(data_dir.join("workspace").is_dir());
    assert!(data_dir.join("tools").is_dir());
}

#[tokio::test]
async fn ports_count_up_and_skip_registered_ones() {
    let f = fixture();
    f.worker.set_healthy(9000);
    f.worker.set_healthy(9001);
    let a = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    let b = f.host.ensure_running(&id("b"), &EnsureOptions::new()).await.unwrap();
    assert_eq!(a.port, 9000);
    assert_eq!(b.port, 9001);
}

#[tokio::test]
async fn ensure_on_healthy_agent_is_a_no_op() {
    let f = fixture();
    f.worker.set_healthy(9000);
    let first = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    let probes_after_start = f.worker.health_calls(9000);

    let again = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    assert_eq!(again.container_id, first.container_id);
    // no second container, no startup poll
    assert_eq!(f.runtime.removed_names().len(), 1);
    assert_eq!(f.worker.health_calls(9000), probes_after_start);
}

#[tokio::test]
async fn crashed_container_is_restarted_on_same_port() {
    let f = fixture();
    f.worker.set_healthy(9000);
    let first = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    f.runtime.kill("ah-agent-a");

    let second = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    assert_eq!(second.port, first.port);
    assert_ne!(second.container_id, first.container_id);
    assert_eq!(second.status, AgentStatus::Running);
}

#[tokio::test]
async fn startup_health_is_polled_until_ready() {
    let f = fixture();
    f.worker.set_healthy_after(9000, 3);
    let record = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    assert_eq!(record.status, AgentStatus::Running);
    assert!(f.worker.health_calls(9000) >= 4);
}

#[tokio::test]
async fn startup_timeout_marks_record_error() {
    let f = fixture();
    // never healthy
    let err = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap_err();
    assert!(matches!(err, HostError::StartupTimeout { .. }));
    let record = f.host.registry().get(&id("a")).unwrap().unwrap();
    assert_eq!(record.status, AgentStatus::Error);
}

#[tokio::test]
async fn failed_container_start_marks_record_error() {
    let f = fixture();
    f.runtime.fail_next_run();
    let err = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap_err();
    assert!(matches!(err, HostError::Container(_)));
    let record = f.host.registry().get(&id("a")).unwrap().unwrap();
    assert_eq!(record.status, AgentStatus::Error);

    // error is retryable from scratch
    f.worker.set_healthy(record.port);
    let record = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    assert_eq!(record.status, AgentStatus::Running);
}

#[tokio::test]
async fn container_env_carries_agent_identity_and_extras() {
    let dir = tempfile::tempdir().unwrap();
    let config = HostConfig::new(dir.path())
        .health_poll_interval(Duration::from_millis(1))
        .idle_timeout(Duration::from_secs(15 * 60))
        .extra_env(vec![("MODEL_PROFILE".into(), "default".into())]);
    let runtime = FakeRuntime::new();
    let worker = FakeWorkerApi::new();
    worker.set_healthy(9000);
    let host = Host::new(config, runtime.clone(), worker, FakeClock::new());

    host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    let env = runtime.container("ah-agent-a").unwrap().spec.env;
    assert!(env.contains(&("AGENT_ID".into(), "a".into())));
    assert!(env.contains(&("AH_IDLE_TIMEOUT_MINUTES".into(), "15".into())));
    assert!(env.contains(&("MODEL_PROFILE".into(), "default".into())));
    assert!(!env.iter().any(|(k, _)| k == "CUSTOM_INSTRUCTIONS"));
}

#[tokio::test]
async fn inline_instructions_are_written_once() {
    let f = fixture();
    f.worker.set_healthy(9000);
    let opts = EnsureOptions::new().instructions("be terse");
    let record = f.host.ensure_running(&id("a"), &opts).await.unwrap();

    let data_dir = f.host.data_dir(&record);
    let path = data_dir.join(INSTRUCTIONS_FILE);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "be terse");
    let env = f.runtime.container("ah-agent-a").unwrap().spec.env;
    assert!(env.contains(&("CUSTOM_INSTRUCTIONS".into(), "true".into())));

    // with a persisted session, later instructions are ignored
    let mut store = ah_storage::SessionStore::open(&data_dir).unwrap();
    store.append(&serde_json::json!({"role": "user", "content": "hi"})).unwrap();
    f.runtime.kill("ah-agent-a");
    let opts = EnsureOptions::new().instructions("be verbose");
    f.host.ensure_running(&id("a"), &opts).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "be terse");
}

#[tokio::test]
async fn instructions_file_wins_over_inline_text() {
    let f = fixture();
    f.worker.set_healthy(9000);
    let file = f._dir.path().join("prompt.txt");
    std::fs::write(&file, "from file").unwrap();

    let opts = EnsureOptions::new().instructions("inline").instructions_file(file);
    let record = f.host.ensure_running(&id("a"), &opts).await.unwrap();
    let written = std::fs::read_to_string(f.host.data_dir(&record).join(INSTRUCTIONS_FILE)).unwrap();
    assert_eq!(written, "from file");
}

#[tokio::test]
async fn missing_or_empty_instructions_file_is_an_error() {
    let f = fixture();
    let opts = EnsureOptions::new().instructions_file(f._dir.path().join("absent.txt"));
    let err = f.host.ensure_running(&id("a"), &opts).await.unwrap_err();
    assert!(matches!(err, HostError::Instructions { .. }));

    let empty = f._dir.path().join("empty.txt");
    std::fs::write(&empty, "  \n").unwrap();
    let opts = EnsureOptions::new().instructions_file(empty);
    let err = f.host.ensure_running(&id("a"), &opts).await.unwrap_err();
    assert!(matches!(err, HostError::Instructions { .. }));

    // nothing was created for the agent
    assert!(f.host.registry().get(&id("a")).unwrap().is_none());
}

#[tokio::test]
async fn stop_agent_stops_container_and_updates_record() {
    let f = fixture();
    f.worker.set_healthy(9000);
    let record = f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    f.clock.advance(Duration::from_secs(5));

    let stopped = f.host.stop_agent(&id("a")).await.unwrap();
    assert_eq!(stopped.status, AgentStatus::Stopped);
    assert_eq!(stopped.last_activity_ms, record.last_activity_ms + 5_000);
    assert_eq!(f.runtime.stopped_ids(), vec![record.container_id.unwrap()]);
    assert!(f.runtime.running_names().is_empty());

    // stopping again is a no-op, unknown agents are errors
    f.host.stop_agent(&id("a")).await.unwrap();
    assert!(matches!(
        f.host.stop_agent(&id("ghost")).await,
        Err(HostError::UnknownAgent(_))
    ));
}

#[tokio::test]
async fn list_agents_reconciles_stale_running_status() {
    let f = fixture();
    f.worker.set_healthy(9000);
    f.worker.set_healthy(9001);
    f.host.ensure_running(&id("a"), &EnsureOptions::new()).await.unwrap();
    f.host.ensure_running(&id("b"), &EnsureOptions::new()).await.unwrap();
    f.worker.set_processing(9001, true);
    f.runtime.kill("ah-agent-a");

    let summaries = f.host.list_agents().await.unwrap();
    assert_eq!(summaries.len(), 2);
    let a = summaries.iter().find(|s| s.record.agent_id == id("a")).unwrap();
    let b = summaries.iter().find(|s| s.record.agent_id == id("b")).unwrap();
    assert_eq!(a.record.status, AgentStatus::Stopped);
    assert!(!a.processing);
    assert_eq!(b.record.status, AgentStatus::Running);
    assert!(b.processing);

    // the reconciliation persisted
    let record = f.host.registry().get(&id("a")).unwrap().unwrap();
    assert_eq!(record.status, AgentStatus::Stopped);
}
