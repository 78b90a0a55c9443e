use std::time::Duration;

use tracing::debug;

use crate::error::{InsightError, Result};

/// Fetches insight fragments of one campaign from the campaign server.
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    base_url: String,
    campaign_id: String,
}

impl InsightClient {
    pub fn new(base_url: &str, campaign_id: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InsightError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            campaign_id: campaign_id.to_string(),
        })
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    /// `GET /campaign/{campaignId}/{functionId}`
    pub fn insight_url(&self, function_id: &str) -> String {
        format!("{}/campaign/{}/{}", self.base_url, self.campaign_id, function_id)
    }

    /// `GET /campaign/osmcha_errors/{campaignId}`
    pub fn osmcha_url(&self) -> String {
        format!("{}/campaign/osmcha_errors/{}", self.base_url, self.campaign_id)
    }

    /// Fetch the rendered fragment of one insight function.
    pub async fn fetch_insight(&self, function_id: &str) -> Result<String> {
        self.get_text(function_id, self.insight_url(function_id)).await
    }

    /// Fetch the osmcha error count (plain text).
    pub async fn fetch_osmcha_errors(&self) -> Result<String> {
        self.get_text("osmcha_errors", self.osmcha_url()).await
    }

    async fn get_text(&self, target: &str, url: String) -> Result<String> {
        debug!(target_id = target, url = %url, "fetching");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| InsightError::fetch(target, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::fetch(target, format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| InsightError::fetch(target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = InsightClient::new("http://localhost:5000/", "abc123", Duration::from_secs(5)).unwrap();
        assert_eq!(client.insight_url("function-1"), "http://localhost:5000/campaign/abc123/function-1");
        assert_eq!(client.osmcha_url(), "http://localhost:5000/campaign/osmcha_errors/abc123");
    }

    #[test]
    fn test_unreachable_server_is_fetch_error() {
        let client = InsightClient::new("http://127.0.0.1:1", "abc123", Duration::from_secs(2)).unwrap();
        let err = tokio_test::block_on(client.fetch_insight("function-1")).unwrap_err();
        match err {
            InsightError::Fetch { target, .. } => assert_eq!(target, "function-1"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
