use clawdash_chat::GatewayConfig;
use clawdash_dashboard::MemoryConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Overrides `gateway.base_url`.
pub const ENV_API_URL: &str = "CLAWDASH_API_URL";
/// Overrides `gateway.api_token`.
pub const ENV_GATEWAY_TOKEN: &str = "CLAWDASH_GATEWAY_TOKEN";
/// Overrides `gateway.agent_id`.
pub const ENV_AGENT_ID: &str = "CLAWDASH_AGENT_ID";
/// Overrides `memory.base_url`.
pub const ENV_MEM0_URL: &str = "CLAWDASH_MEM0_URL";

#[derive(Debug, Default, Deserialize)]
pub struct ClawdashConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl ClawdashConfig {
    /// Reads `path`, or starts from defaults when the file does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::parse(&text).map_err(|e| {
                anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            )),
        }
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies environment overrides; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.gateway.base_url = url;
        }
        if let Some(token) = get(ENV_GATEWAY_TOKEN) {
            self.gateway.api_token = Some(token);
        }
        if let Some(agent) = get(ENV_AGENT_ID) {
            self.gateway.agent_id = agent;
        }
        if let Some(url) = get(ENV_MEM0_URL) {
            self.memory.base_url = url;
        }
    }
}
