// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/1.1 client for the worker API over TCP.
//!
//! Requests are written by hand and responses read with Content-Length
//! framing (does not depend on connection close for EOF). Each call opens
//! a fresh connection; the whole operation (connect + write + read) runs
//! under one timeout.

use super::{ChatReply, WorkerApi, WorkerApiError, WorkerHealth};
use ah_core::NormalizedMessage;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// [`WorkerApi`] over plain TCP to `127.0.0.1:<port>`.
#[derive(Debug, Clone)]
pub struct HttpWorkerClient {
    /// Timeout for health and history calls. Chat carries its own.
    query_timeout: Duration,
}

impl Default for HttpWorkerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpWorkerClient {
    pub fn new() -> Self {
        Self { query_timeout: DEFAULT_QUERY_TIMEOUT }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    async fn get(&self, port: u16, path: &str, timeout: Duration) -> Result<String, WorkerApiError> {
        let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path);
        timed_request(port, &request, timeout).await
    }

    async fn post(
        &self,
        port: u16,
        path: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<String, WorkerApiError> {
        let request = format!(
            "POST {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            path,
            body.len(),
            body
        );
        timed_request(port, &request, timeout).await
    }
}

#[async_trait]
impl WorkerApi for HttpWorkerClient {
    async fn health(&self, port: u16) -> Result<WorkerHealth, WorkerApiError> {
        let body = self.get(port, "/health", self.query_timeout).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn chat(
        &self,
        port: u16,
        message: &str,
        timeout: Duration,
    ) -> Result<ChatReply, WorkerApiError> {
        let body = serde_json::json!({ "message": message }).to_string();
        let reply = self.post(port, "/chat", &body, timeout).await?;
        Ok(serde_json::from_str(&reply)?)
    }

    async fn history(
        &self,
        port: u16,
        count: Option<usize>,
        include_tools: bool,
    ) -> Result<Vec<NormalizedMessage>, WorkerApiError> {
        let mut params = Vec::new();
        if let Some(n) = count {
            params.push(format!("count={}", n));
        }
        if !include_tools {
            params.push("include_tools=false".to_string());
        }
        let path = if params.is_empty() {
            "/history".to_string()
        } else {
            format!("/history?{}", params.join("&"))
        };
        let body = self.get(port, &path, self.query_timeout).await?;
        let parsed: HistoryBody = serde_json::from_str(&body)?;
        Ok(parsed.messages)
    }
}

#[derive(Deserialize)]
struct HistoryBody {
    #[serde(default)]
    messages: Vec<NormalizedMessage>,
}

async fn timed_request(port: u16, request: &str, timeout: Duration) -> Result<String, WorkerApiError> {
    tokio::time::timeout(timeout, send_request(port, request))
        .await
        .map_err(|_| WorkerApiError::Timeout(timeout))?
}

async fn send_request(port: u16, request: &str) -> Result<String, WorkerApiError> {
    let addr = format!("127.0.0.1:{}", port);
    let mut stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| WorkerApiError::Connect { addr, source })?;
    stream.write_all(request.as_bytes()).await?;

    let mut reader = BufReader::new(&mut stream);
    read_http_response(&mut reader).await
}

/// Read and parse an HTTP/1.1 response from a buffered stream.
async fn read_http_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<String, WorkerApiError> {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await?;
    let status_code =
        status_line.split_whitespace().nth(1).and_then(|s| s.parse::<u16>().ok()).unwrap_or(0);

    // Headers, extracting Content-Length (case-insensitive)
    let mut content_length: usize = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let line_lower = line.to_ascii_lowercase();
        if let Some(val) = line_lower.strip_prefix("content-length:") {
            content_length = val.trim().parse().unwrap_or(0);
        }
    }

    let body = if content_length > 0 {
        let mut buf = vec![0u8; content_length];
        reader.read_exact(&mut buf).await?;
        String::from_utf8_lossy(&buf).into_owned()
    } else {
        String::new()
    };

    if status_code >= 400 {
        return Err(WorkerApiError::Status { status: status_code, body: body.trim().to_string() });
    }

    Ok(body)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
