//! Transport seam between the chat session and the gateway.

use crate::config::{GatewayConfig, AGENT_ID_HEADER};
use async_trait::async_trait;
use clawdash_core::{ClawdashError, ClawdashResult};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

/// A response body as an ordered stream of raw chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = ClawdashResult<Vec<u8>>> + Send>>;

/// Body of a streaming responses request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRequest {
    /// Gateway model name, e.g. `openclaw:astrologer`.
    pub model: String,
    /// The user's text, already trimmed.
    pub input: String,
    /// Always true for chat turns.
    pub stream: bool,
    /// Opaque tag identifying the caller.
    pub user: String,
}

impl ResponseRequest {
    /// Builds a streaming request for `input`.
    pub fn streaming(model: impl Into<String>, input: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            stream: true,
            user: user.into(),
        }
    }
}

/// Opens response streams.
///
/// Implementations return `Err` for transport failures and non-success
/// status codes; a returned stream may still fail mid-body.
#[async_trait]
pub trait ResponseTransport: Send + Sync {
    /// Sends `request` and returns the response body.
    async fn open_stream(&self, request: &ResponseRequest) -> ClawdashResult<ByteStream>;
}

/// HTTP transport for the gateway's `/v1/responses` endpoint.
pub struct GatewayClient {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Builds a client with the configured request timeout.
    pub fn new(config: GatewayConfig) -> ClawdashResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClawdashError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Settings this client was built from.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn add_gateway_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Content-Type", "application/json")
            .header(AGENT_ID_HEADER, &self.config.agent_id);

        if let Some(token) = self.config.token() {
            request.header("Authorization", format!("Bearer {token}"))
        } else {
            request
        }
    }
}

#[async_trait]
impl ResponseTransport for GatewayClient {
    async fn open_stream(&self, request: &ResponseRequest) -> ClawdashResult<ByteStream> {
        let url = self.config.responses_url();
        debug!(url = %url, model = %request.model, "Opening response stream");

        let resp = self
            .add_gateway_headers(self.http.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| ClawdashError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(status = status.as_u16(), "Gateway rejected response request");
            return Err(ClawdashError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| ClawdashError::Http(format!("Stream read error: {e}")))
        });

        Ok(Box::pin(body))
    }
}
