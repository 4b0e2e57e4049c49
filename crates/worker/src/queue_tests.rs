// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::ScriptedRunner;
use std::time::Duration;

fn session(dir: &tempfile::TempDir) -> Arc<Mutex<SessionStore>> {
    Arc::new(Mutex::new(SessionStore::open(dir.path()).unwrap()))
}

fn start<T: TurnRunner>(runner: Arc<T>, session: Arc<Mutex<SessionStore>>) -> RequestQueue {
    let (queue, consumer) = RequestQueue::new();
    tokio::spawn(async move { consumer.run(runner, session).await });
    queue
}

#[tokio::test]
async fn turns_execute_in_submission_order() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new().with_delay(Duration::from_millis(2)));
    let queue = start(Arc::clone(&runner), session(&dir));

    let (a, b, c) = tokio::join!(queue.submit("first"), queue.submit("second"), queue.submit("third"));
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(*runner.turns.lock(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn each_submitter_gets_its_own_reply() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new());
    runner.push_reply("answer one");
    runner.push_reply("answer two");
    let queue = start(Arc::clone(&runner), session(&dir));

    let (a, b) = tokio::join!(queue.submit("q1"), queue.submit("q2"));
    assert_eq!(a.unwrap(), "answer one");
    assert_eq!(b.unwrap(), "answer two");
}

#[tokio::test]
async fn failed_turn_fails_only_its_submitter() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new());
    runner.push_failure("model exploded");
    runner.push_reply("recovered");
    let queue = start(Arc::clone(&runner), session(&dir));

    let (a, b) = tokio::join!(queue.submit("bad"), queue.submit("good"));
    assert!(matches!(a, Err(TurnError::Command(_))));
    assert_eq!(b.unwrap(), "recovered");
}

#[tokio::test]
async fn completed_turns_are_persisted_failed_ones_are_not() {
    let dir = tempfile::tempdir().unwrap();
    let store = session(&dir);
    let runner = Arc::new(ScriptedRunner::new());
    runner.push_failure("nope");
    runner.push_reply("fine");
    let queue = start(Arc::clone(&runner), Arc::clone(&store));

    let _ = queue.submit("broken turn").await;
    queue.submit("working turn").await.unwrap();

    let raw = store.lock().load_raw();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0]["role"], "user");
    assert_eq!(raw[0]["content"], "working turn");
    assert_eq!(raw[1]["role"], "assistant");
    assert_eq!(raw[1]["content"], "fine");
}

#[tokio::test]
async fn depth_and_processing_track_the_queue() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new().with_delay(Duration::from_millis(50)));
    let queue = start(Arc::clone(&runner), session(&dir));

    assert!(!queue.is_processing());
    assert_eq!(queue.depth(), 0);

    let q1 = queue.clone();
    let first = tokio::spawn(async move { q1.submit("slow").await });
    let q2 = queue.clone();
    let second = tokio::spawn(async move { q2.submit("waiting").await });

    // one turn in flight, at most one waiting behind it
    for _ in 0..100 {
        if queue.is_processing() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(queue.is_processing());
    assert!(queue.depth() <= 1);

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert!(!queue.is_processing());
    assert_eq!(queue.depth(), 0);
}

#[tokio::test]
async fn submit_after_consumer_is_gone_reports_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let _ = &dir;
    let (queue, consumer) = RequestQueue::new();
    drop(consumer);

    assert!(matches!(queue.submit("anyone there").await, Err(TurnError::Shutdown)));
    assert_eq!(queue.depth(), 0);
}
