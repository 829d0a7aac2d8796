use crate::error::MetricsError;
use log::{info, warn};
use serde_json::Value;
use tokio::time::{sleep, Duration};

const GATEWAY_BASE: &str = "https://gateway.thegraph.com/api";
const MAX_RETRIES: usize = 5;
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(60);

/// Thin client for the gateway's GraphQL endpoints. One instance is shared
/// by all fetchers; it holds no per-section state.
pub struct GraphClient {
    http: reqwest::Client,
    api_key: String,
}

impl GraphClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
        }
    }

    /// POST one GraphQL query and return its `data` object. Rate-limit
    /// responses (HTTP 429 or a gateway "request limit" error payload) are
    /// retried a bounded number of times with a backoff; anything else
    /// fails the section.
    pub async fn query(
        &self,
        section: &'static str,
        subgraph_id: &str,
        query: &str,
    ) -> Result<Value, MetricsError> {
        let url = format!(
            "{}/{}/subgraphs/id/{}",
            GATEWAY_BASE, self.api_key, subgraph_id
        );

        for attempt in 0..MAX_RETRIES {
            info!("Querying `{}` (attempt {})", section, attempt + 1);

            let response = self
                .http
                .post(&url)
                .json(&serde_json::json!({ "query": query }))
                .send()
                .await
                .map_err(|e| MetricsError::fetch(section, e.to_string()))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!(
                    "Rate limit reached on `{}`. Waiting before retrying...",
                    section
                );
                sleep(RATE_LIMIT_BACKOFF).await;
                continue;
            }

            if !response.status().is_success() {
                return Err(MetricsError::fetch(
                    section,
                    format!("gateway returned {}", response.status()),
                ));
            }

            let json: Value = response
                .json()
                .await
                .map_err(|e| MetricsError::fetch(section, e.to_string()))?;

            if let Some(errors) = json.get("errors") {
                let text = errors.to_string();
                if text.contains("request limit") {
                    warn!(
                        "Rate limit reached on `{}`. Waiting before retrying...",
                        section
                    );
                    sleep(RATE_LIMIT_BACKOFF).await;
                    continue;
                }
                return Err(MetricsError::fetch(section, text));
            }

            match json.get("data") {
                Some(data) if !data.is_null() => return Ok(data.clone()),
                _ => {
                    warn!("Unexpected response format from gateway: {:?}", json);
                    if attempt == MAX_RETRIES - 1 {
                        break;
                    }
                    sleep(RATE_LIMIT_BACKOFF).await;
                }
            }
        }

        Err(MetricsError::fetch(
            section,
            "max retries reached without a usable response",
        ))
    }
}
