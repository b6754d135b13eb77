use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{SourceError, SupplySource};
use crate::config::BackendConfig;

/// Queries the info server's `/supply_info` endpoint.
pub struct HttpSupplySource {
    client: Client,
    url: String,
}

impl HttpSupplySource {
    pub fn new(config: &BackendConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SupplySource for HttpSupplySource {
    fn name(&self) -> &'static str {
        "info-server"
    }

    async fn fetch_supply(&self) -> Result<Value, SourceError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        // The server reports "not ready yet" as a JSON string with a 500, so
        // the status is logged but the body is always handed on.
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("{} answered {}", self.url, status);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))
    }
}
