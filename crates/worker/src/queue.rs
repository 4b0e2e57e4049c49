// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker request serialization.
//!
//! All chat turns funnel through one unbounded FIFO with a single
//! consumer, so turns execute strictly in arrival order and never
//! interleave. Each entry carries its own reply channel; a failed turn
//! answers only its submitter and the consumer moves on.

use crate::runner::{TurnError, TurnRunner};
use ah_storage::SessionStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

struct Entry {
    message: String,
    reply: oneshot::Sender<Result<String, TurnError>>,
}

/// Submission handle. Clones share one queue and one consumer.
#[derive(Clone)]
pub struct RequestQueue {
    tx: mpsc::UnboundedSender<Entry>,
    depth: Arc<AtomicUsize>,
    processing: Arc<AtomicBool>,
}

/// The single consumer side; run it on a dedicated task.
pub struct QueueConsumer {
    rx: mpsc::UnboundedReceiver<Entry>,
    depth: Arc<AtomicUsize>,
    processing: Arc<AtomicBool>,
}

impl RequestQueue {
    pub fn new() -> (Self, QueueConsumer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));
        let processing = Arc::new(AtomicBool::new(false));
        let queue =
            Self { tx, depth: Arc::clone(&depth), processing: Arc::clone(&processing) };
        (queue, QueueConsumer { rx, depth, processing })
    }

    /// Enqueue one turn and wait for its result.
    pub async fn submit(&self, message: impl Into<String>) -> Result<String, TurnError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let entry = Entry { message: message.into(), reply: reply_tx };
        self.depth.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(entry).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(TurnError::Shutdown);
        }
        reply_rx.await.unwrap_or(Err(TurnError::Shutdown))
    }

    /// Entries waiting behind the current turn.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// True while the consumer is executing a turn.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }
}

impl QueueConsumer {
    /// Drain the queue until every submission handle is dropped.
    ///
    /// Completed turns are persisted to the session store before the
    /// submitter is answered, so a transcript read immediately after a
    /// reply always sees the turn.
    pub async fn run<T: TurnRunner>(mut self, runner: Arc<T>, session: Arc<Mutex<SessionStore>>) {
        while let Some(entry) = self.rx.recv().await {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            self.processing.store(true, Ordering::SeqCst);

            let result = runner.run_turn(&entry.message).await;

            match &result {
                Ok(response) => {
                    persist_turn(&session, &entry.message, response);
                }
                Err(e) => {
                    tracing::error!(error = %e, "turn failed");
                }
            }

            self.processing.store(false, Ordering::SeqCst);
            // Submitter may have given up waiting; that is not our problem
            let _ = entry.reply.send(result);
        }
    }
}

fn persist_turn(session: &Mutex<SessionStore>, message: &str, response: &str) {
    let mut store = session.lock();
    let user = serde_json::json!({"role": "user", "content": message});
    let assistant = serde_json::json!({"role": "assistant", "content": response});
    for msg in [user, assistant] {
        if let Err(e) = store.append(&msg) {
            tracing::error!(error = %e, "failed to persist turn");
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
