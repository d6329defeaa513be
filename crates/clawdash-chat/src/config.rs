//! Gateway connection settings.

use serde::{Deserialize, Serialize};

/// Header naming the agent that should answer a request.
pub const AGENT_ID_HEADER: &str = "x-openclaw-agent-id";

/// Connection settings for the agent gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway root, e.g. `http://localhost:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. Requests go out unauthenticated when unset or empty.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Agent that answers, sent as the agent id header.
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    /// Model name sent in the request body; derived from `agent_id` if unset.
    #[serde(default)]
    pub model: Option<String>,
    /// Opaque tag identifying the dashboard to the gateway.
    #[serde(default = "default_user_tag")]
    pub user_tag: String,
    /// Whole-request timeout, covering the streamed body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_agent_id() -> String {
    "astrologer".to_string()
}

fn default_user_tag() -> String {
    "dashboard-user".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            agent_id: default_agent_id(),
            model: None,
            user_tag: default_user_tag(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    /// Model name for the responses endpoint.
    pub fn model_name(&self) -> String {
        match &self.model {
            Some(model) if !model.is_empty() => model.clone(),
            _ => format!("openclaw:{}", self.agent_id),
        }
    }

    /// Full URL of the streaming responses endpoint.
    pub fn responses_url(&self) -> String {
        format!("{}/v1/responses", self.base_url.trim_end_matches('/'))
    }

    /// The bearer token, if one is configured.
    pub fn token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Token rendered for display: first and last eight characters only.
    pub fn masked_token(&self) -> String {
        match self.token() {
            None => "not set".to_string(),
            Some(token) => {
                let chars: Vec<char> = token.chars().collect();
                let head: String = chars.iter().take(8).collect();
                let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
                format!("{head}...{tail}")
            }
        }
    }
}
