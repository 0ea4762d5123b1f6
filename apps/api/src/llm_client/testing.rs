//! Test doubles for the `Transport` seam.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::types::GenerateContentRequest;
use super::{GenerationClient, MODEL, LlmError, RetryPolicy, Transport, TransportResponse};

/// Replays scripted responses in order and records every request it sees.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, LlmError>>>,
    calls: Mutex<Vec<(String, String, GenerateContentRequest)>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// A transport whose only reply is a successful candidate carrying `text`.
    pub fn replying_text(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(candidate_body(text, "STOP"))])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, request)| request.clone())
            .collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _, _)| url.clone()).collect()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, key, _)| key.clone()).collect()
    }

    /// Text of the instruction sent on the `index`-th call.
    pub fn instruction(&self, index: usize) -> String {
        self.requests()[index].contents[0].parts[0]
            .text
            .clone()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_generate(
        &self,
        url: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<TransportResponse, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), api_key.to_string(), request.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("no scripted response left".to_string())))
    }
}

/// A 200 response whose single candidate carries `text`.
pub fn candidate_body(text: &str, finish_reason: &str) -> TransportResponse {
    let body = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": finish_reason
        }]
    });
    TransportResponse {
        status: 200,
        body: Bytes::from(body.to_string()),
    }
}

/// A client over `transport` allowing three attempts. Tests that exercise
/// back-off run with a paused tokio clock.
pub fn client_with(transport: Arc<ScriptedTransport>, api_key: Option<&str>) -> GenerationClient {
    GenerationClient::new(
        transport,
        api_key.map(str::to_string),
        "https://example.test",
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        },
    )
}

/// Accepts a single connection on a loopback port, reads one request and
/// writes `response` back verbatim. Returns the generateContent URL to call
/// and a handle resolving to the raw request text.
pub async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!(
        "http://{}/v1beta/models/{MODEL}:generateContent",
        listener.local_addr().unwrap()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        // The client may hang up mid-body once it has seen enough.
        let _ = socket.write_all(&response).await;
        let _ = socket.shutdown().await;
        request
    });

    (url, handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A raw HTTP/1.1 response with a fixed `Content-Length` header.
pub fn sized_response(status_line: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

/// A raw HTTP/1.1 200 response streaming `chunks` chunks of `chunk_size`
/// bytes with chunked transfer encoding and no `Content-Length`.
pub fn chunked_response(chunks: usize, chunk_size: usize) -> Vec<u8> {
    let mut out = b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n".to_vec();
    for _ in 0..chunks {
        out.extend_from_slice(format!("{chunk_size:x}\r\n").as_bytes());
        out.extend(std::iter::repeat(b' ').take(chunk_size));
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}
