//! Gateway health and service status probes.

use clawdash_chat::GatewayConfig;
use clawdash_core::{ClawdashError, ClawdashResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reachability of one backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// The service answered.
    Online,
    /// The service failed or could not be reached.
    Offline,
    /// Only reachable from inside the deployment network; not probed.
    Internal,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceStatus::Online => "Online",
            ServiceStatus::Offline => "Offline",
            ServiceStatus::Internal => "Internal",
        };
        f.write_str(label)
    }
}

/// One row of the service status table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    /// Display name.
    pub name: String,
    /// Where the service lives, or a description if not directly reachable.
    pub url: String,
    /// Probe result.
    pub status: ServiceStatus,
    /// Extra context shown under the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Probes the gateway the way the dashboard and settings pages do.
pub struct StatusProbe {
    gateway: GatewayConfig,
    http: reqwest::Client,
}

impl StatusProbe {
    /// Creates a probe for `gateway` with a short request timeout.
    pub fn new(gateway: GatewayConfig) -> ClawdashResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| ClawdashError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { gateway, http })
    }

    fn base(&self) -> &str {
        self.gateway.base_url.trim_end_matches('/')
    }

    /// `GET /health`: online iff the gateway answers with a 2xx status.
    pub async fn gateway_health(&self) -> ServiceStatus {
        let url = format!("{}/health", self.base());
        match self.http.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => ServiceStatus::Online,
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), "Gateway health check failed");
                ServiceStatus::Offline
            }
            Err(e) => {
                debug!(error = %e, "Gateway unreachable");
                ServiceStatus::Offline
            }
        }
    }

    /// Probes the responses endpoint with an empty request.
    ///
    /// Any status below 500 means the gateway is up (a 4xx for the empty
    /// input is expected). If the request cannot be sent at all, a plain
    /// `GET /` decides.
    pub async fn responses_endpoint(&self) -> ServiceStatus {
        let mut request = self
            .http
            .post(self.gateway.responses_url())
            .header("Content-Type", "application/json");
        if let Some(token) = self.gateway.token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let probe = request
            .json(&serde_json::json!({ "model": "openclaw", "input": "" }))
            .send()
            .await;

        match probe {
            Ok(resp) if resp.status().as_u16() < 500 => ServiceStatus::Online,
            Ok(_) => ServiceStatus::Offline,
            Err(e) => {
                debug!(error = %e, "Responses probe failed, trying gateway root");
                match self.http.get(format!("{}/", self.base())).send().await {
                    Ok(_) => ServiceStatus::Online,
                    Err(_) => ServiceStatus::Offline,
                }
            }
        }
    }

    /// Status rows for the settings page: the probed gateway plus the
    /// services only the gateway can reach.
    pub async fn service_reports(&self) -> Vec<ServiceReport> {
        vec![
            ServiceReport {
                name: "OpenClaw Gateway".to_string(),
                url: self.gateway.base_url.clone(),
                status: self.responses_endpoint().await,
                note: None,
            },
            ServiceReport {
                name: "Mem0 Server".to_string(),
                url: "Internal (Docker Network)".to_string(),
                status: ServiceStatus::Internal,
                note: Some("Accessible via Gateway internally".to_string()),
            },
            ServiceReport {
                name: "Qdrant".to_string(),
                url: "Internal (Docker Network)".to_string(),
                status: ServiceStatus::Internal,
                note: Some("Connected via Mem0 service".to_string()),
            },
        ]
    }
}
