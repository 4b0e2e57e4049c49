// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

async fn wait_for_cancel(token: &CancellationToken, max: Duration) -> bool {
    tokio::time::timeout(max, token.cancelled()).await.is_ok()
}

#[tokio::test]
async fn idle_worker_cancels_the_shutdown_token() {
    let shutdown = CancellationToken::new();
    let watch = IdleWatch::new(Some(Duration::from_millis(20)), shutdown.clone());
    watch.spawn();

    assert!(wait_for_cancel(&shutdown, Duration::from_secs(2)).await);
}

#[tokio::test]
async fn activity_keeps_the_worker_alive() {
    let shutdown = CancellationToken::new();
    let watch = IdleWatch::new(Some(Duration::from_millis(40)), shutdown.clone());
    watch.spawn();

    for _ in 0..10 {
        watch.touch();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!shutdown.is_cancelled());
}

#[tokio::test]
async fn no_timeout_means_no_watchdog() {
    let shutdown = CancellationToken::new();
    let watch = IdleWatch::new(None, shutdown.clone());
    watch.spawn();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shutdown.is_cancelled());
}
