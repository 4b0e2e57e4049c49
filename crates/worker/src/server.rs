// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker HTTP surface.
//!
//! Three endpoints, all JSON:
//! - `GET /health`: liveness plus queue visibility
//! - `POST /chat`: submit a turn, blocking until the queue answers
//! - `GET /history`: the persisted transcript, normalized

use crate::idle::IdleWatch;
use crate::queue::RequestQueue;
use ah_core::NormalizedMessage;
use ah_storage::SessionStore;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub agent_id: String,
    pub queue: RequestQueue,
    pub session: Arc<Mutex<SessionStore>>,
    pub idle: IdleWatch,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/history", get(history))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    agent_id: String,
    processing: bool,
    queue_depth: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        agent_id: state.agent_id.clone(),
        processing: state.queue.is_processing(),
        queue_depth: state.queue.depth(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    status: &'static str,
    response: String,
    agent_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    error: String,
    agent_id: String,
}

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    state.idle.touch();
    match state.queue.submit(req.message).await {
        Ok(response) => Json(ChatResponse {
            status: "success",
            response,
            agent_id: state.agent_id.clone(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                status: "error",
                error: e.to_string(),
                agent_id: state.agent_id.clone(),
            }),
        )
            .into_response(),
    }
}

fn default_include_tools() -> bool {
    true
}

#[derive(Deserialize)]
struct HistoryQuery {
    count: Option<usize>,
    #[serde(default = "default_include_tools")]
    include_tools: bool,
}

#[derive(Serialize)]
struct HistoryResponse {
    status: &'static str,
    messages: Vec<NormalizedMessage>,
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    state.idle.touch();
    let raw = state.session.lock().load_raw();
    let mut messages = ah_storage::normalize_messages(&raw, query.include_tools);
    if let Some(count) = query.count {
        if count < messages.len() {
            messages.drain(..messages.len() - count);
        }
    }
    Json(HistoryResponse { status: "success", messages })
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
