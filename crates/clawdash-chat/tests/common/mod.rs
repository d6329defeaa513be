//! Shared transports for chat integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use clawdash_chat::{ByteStream, ResponseRequest, ResponseTransport};
use clawdash_core::{ClawdashError, ClawdashResult};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Replays a fixed list of body chunks, exactly as split.
pub struct ChunkTransport {
    chunks: Vec<Result<Vec<u8>, String>>,
    pub requests: Mutex<Vec<ResponseRequest>>,
}

impl ChunkTransport {
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            chunks: chunks.into_iter().map(|c| Ok(c.as_ref().to_vec())).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Appends a read failure after the configured chunks.
    pub fn then_fail(mut self, message: &str) -> Self {
        self.chunks.push(Err(message.to_string()));
        self
    }
}

#[async_trait]
impl ResponseTransport for ChunkTransport {
    async fn open_stream(&self, request: &ResponseRequest) -> ClawdashResult<ByteStream> {
        self.requests.lock().unwrap().push(request.clone());
        let chunks: Vec<ClawdashResult<Vec<u8>>> = self
            .chunks
            .iter()
            .map(|c| match c {
                Ok(bytes) => Ok(bytes.clone()),
                Err(message) => Err(ClawdashError::Http(message.clone())),
            })
            .collect();
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

/// Fails before any body is available.
pub struct FailingTransport(pub fn() -> ClawdashError);

#[async_trait]
impl ResponseTransport for FailingTransport {
    async fn open_stream(&self, _request: &ResponseRequest) -> ClawdashResult<ByteStream> {
        Err((self.0)())
    }
}

/// Body fed chunk by chunk from the test through a channel.
pub struct ChannelTransport {
    receiver: Mutex<Option<mpsc::Receiver<ClawdashResult<Vec<u8>>>>>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::Sender<ClawdashResult<Vec<u8>>>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl ResponseTransport for ChannelTransport {
    async fn open_stream(&self, _request: &ResponseRequest) -> ClawdashResult<ByteStream> {
        let rx = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ClawdashError::Http("body already taken".to_string()))?;
        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

pub fn delta(text: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({ "type": "response.output_text.delta", "delta": text })
    )
}

pub fn completed(parts: &[&str]) -> String {
    let content: Vec<serde_json::Value> = parts
        .iter()
        .map(|t| serde_json::json!({ "type": "output_text", "text": t }))
        .collect();
    format!(
        "data: {}\n",
        serde_json::json!({
            "type": "response.completed",
            "response": { "output": [{ "type": "message", "content": content }] }
        })
    )
}
