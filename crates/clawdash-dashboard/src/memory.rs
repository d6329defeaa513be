//! Client for the Mem0 memory proxy.

use clawdash_core::{ClawdashError, ClawdashResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the memory service proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Proxy root, e.g. `http://localhost:8002`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Page size when browsing a user's memories.
    #[serde(default = "default_list_limit")]
    pub default_limit: u32,
    /// Maximum number of search hits requested.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_list_limit() -> u32 {
    100
}

fn default_search_limit() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_limit: default_list_limit(),
            search_limit: default_search_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One stored memory as shown in the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Service-assigned identifier.
    pub id: String,
    /// The remembered text.
    pub memory: String,
    /// Content hash, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Free-form metadata; search hits add `score`.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Creation time as sent by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update time as sent by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    memories: Option<Vec<MemoryRecord>>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Client for the memory proxy endpoints.
pub struct MemoryClient {
    base_url: Url,
    config: MemoryConfig,
    http: reqwest::Client,
}

impl MemoryClient {
    /// Creates a client, validating the base URL.
    pub fn new(config: MemoryConfig) -> ClawdashResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClawdashError::Config(format!("Invalid memory base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClawdashError::Config(format!(
                "Memory base URL '{}' cannot carry a path",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClawdashError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url,
            config,
            http,
        })
    }

    /// Lists the memories stored for `user_id`, newest page only.
    pub async fn list(&self, user_id: &str, limit: Option<u32>) -> ClawdashResult<Vec<MemoryRecord>> {
        let user_id = required("user id", user_id)?;
        let limit = limit.unwrap_or(self.config.default_limit);

        let mut url = self.endpoint(&["memories", user_id]);
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        debug!(url = %url, "Listing memories");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClawdashError::Http(e.to_string()))?;
        let envelope: ListEnvelope = resp
            .json()
            .await
            .map_err(|e| ClawdashError::Http(e.to_string()))?;

        if !envelope.success {
            return Err(service_error(envelope.detail, "Failed to fetch memories"));
        }
        Ok(envelope.memories.unwrap_or_default())
    }

    /// Semantic search over a user's memories.
    ///
    /// Hits are normalised into [`MemoryRecord`]s: a missing id becomes
    /// `search-<index>`, the text comes from `memory` or `text`, and the hit
    /// score is folded into `metadata["score"]`.
    pub async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: Option<u32>,
    ) -> ClawdashResult<Vec<MemoryRecord>> {
        let user_id = required("user id", user_id)?;
        let query = required("search query", query)?;
        let limit = limit.unwrap_or(self.config.search_limit);

        let body = serde_json::json!({
            "query": query,
            "user_id": user_id,
            "limit": limit,
        });

        let resp = self
            .http
            .post(self.endpoint(&["search"]))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClawdashError::Http(e.to_string()))?;
        let envelope: SearchEnvelope = resp
            .json()
            .await
            .map_err(|e| ClawdashError::Http(e.to_string()))?;

        if !envelope.success {
            return Err(service_error(envelope.detail, "Search failed"));
        }

        let hits = envelope.results.unwrap_or_default();
        debug!(hits = hits.len(), "Memory search completed");
        Ok(hits
            .iter()
            .enumerate()
            .map(|(i, hit)| search_hit_to_record(i, hit))
            .collect())
    }

    /// Deletes one memory by id.
    pub async fn delete(&self, memory_id: &str) -> ClawdashResult<()> {
        let memory_id = required("memory id", memory_id)?;
        self.send_delete(self.endpoint(&["memories", memory_id])).await?;
        info!(memory_id, "Memory deleted");
        Ok(())
    }

    /// Deletes every memory stored for `user_id`.
    pub async fn delete_all(&self, user_id: &str) -> ClawdashResult<()> {
        let user_id = required("user id", user_id)?;
        self.send_delete(self.endpoint(&["memories", "user", user_id]))
            .await?;
        info!(user_id, "All memories deleted for user");
        Ok(())
    }

    async fn send_delete(&self, url: Url) -> ClawdashResult<()> {
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| ClawdashError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClawdashError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn required<'a>(what: &str, value: &'a str) -> ClawdashResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClawdashError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(value)
}

fn service_error(detail: Option<serde_json::Value>, fallback: &str) -> ClawdashError {
    let message = match detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    };
    ClawdashError::Memory(message)
}

fn search_hit_to_record(index: usize, hit: &serde_json::Value) -> MemoryRecord {
    let id = hit["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("search-{index}"));

    let memory = hit["memory"]
        .as_str()
        .filter(|s| !s.is_empty())
        .or_else(|| hit["text"].as_str())
        .unwrap_or_default()
        .to_string();

    let mut metadata: HashMap<String, serde_json::Value> = hit["metadata"]
        .as_object()
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    metadata.insert("score".to_string(), hit["score"].clone());

    MemoryRecord {
        id,
        memory,
        hash: hit["hash"].as_str().map(str::to_string),
        metadata,
        created_at: hit["created_at"].as_str().map(str::to_string),
        updated_at: hit["updated_at"].as_str().map(str::to_string),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_hit_mapping() {
        let hit = serde_json::json!({
            "id": "m-1",
            "memory": "Born in Varanasi",
            "score": 0.91,
            "metadata": { "source": "chat" }
        });
        let record = search_hit_to_record(0, &hit);
        assert_eq!(record.id, "m-1");
        assert_eq!(record.memory, "Born in Varanasi");
        assert_eq!(record.metadata["source"], "chat");
        assert_eq!(record.metadata["score"], 0.91);
    }

    #[test]
    fn test_search_hit_fallbacks() {
        let hit = serde_json::json!({ "text": "Prefers Hindi" });
        let record = search_hit_to_record(3, &hit);
        assert_eq!(record.id, "search-3");
        assert_eq!(record.memory, "Prefers Hindi");
        assert_eq!(record.metadata["score"], serde_json::Value::Null);

        let empty = search_hit_to_record(4, &serde_json::json!({}));
        assert_eq!(empty.memory, "");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = MemoryClient::new(MemoryConfig {
            base_url: "http://mem0:8002/api/".to_string(),
            ..MemoryConfig::default()
        })
        .unwrap();
        let url = client.endpoint(&["memories", "user 1/x"]);
        assert_eq!(url.as_str(), "http://mem0:8002/api/memories/user%201%2Fx");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = MemoryClient::new(MemoryConfig {
            base_url: "not a url".to_string(),
            ..MemoryConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, ClawdashError::Config(_)));
    }

    #[test]
    fn test_service_error_detail() {
        let err = service_error(Some(serde_json::json!("user not found")), "fallback");
        assert_eq!(err.to_string(), "Memory service error: user not found");
        let err = service_error(None, "Search failed");
        assert_eq!(err.to_string(), "Memory service error: Search failed");
    }
}
