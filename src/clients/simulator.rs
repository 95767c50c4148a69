use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::traits::SimulationBackend;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::schemas::{ScenarioDetail, ScenarioSummary, SimulateRequest, SimulateResponse};

pub const LIST_FAILED: &str = "Failed to load scenarios";
pub const DETAIL_FAILED: &str = "Failed to load scenario";
pub const SIMULATE_FAILED: &str = "Simulation failed";

/// HTTP client for the simulation backend. Built without a timeout; every
/// failure surfaces as the endpoint's generic message.
#[derive(Clone, Debug)]
pub struct SimulatorClient {
    base_url: String,
    client: Client,
}

impl SimulatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(
        res: std::result::Result<reqwest::Response, reqwest::Error>,
        generic: &'static str,
    ) -> Result<T> {
        let res = res.map_err(|e| {
            tracing::debug!("{}: transport error: {}", generic, e);
            DashboardError::request(generic)
        })?;
        let status = res.status();
        if !status.is_success() {
            tracing::debug!("{}: backend returned {}", generic, status);
            return Err(DashboardError::request(generic));
        }
        res.json::<T>().await.map_err(|e| {
            tracing::debug!("{}: unreadable body: {}", generic, e);
            DashboardError::request(generic)
        })
    }
}

#[async_trait]
impl SimulationBackend for SimulatorClient {
    async fn list_scenarios(&self) -> Result<Vec<ScenarioSummary>> {
        let res = self.client.get(self.url("/scenarios")).send().await;
        Self::read_json(res, LIST_FAILED).await
    }

    async fn get_scenario(&self, id: i64) -> Result<ScenarioDetail> {
        let res = self
            .client
            .get(self.url(&format!("/scenarios/{}", id)))
            .send()
            .await;
        Self::read_json(res, DETAIL_FAILED).await
    }

    async fn simulate(&self, request: &SimulateRequest) -> Result<SimulateResponse> {
        let res = self
            .client
            .post(self.url("/simulate"))
            .json(request)
            .send()
            .await;
        let response: SimulateResponse = Self::read_json(res, SIMULATE_FAILED).await?;
        tracing::debug!(
            "Simulation for scenario {} returned {} results",
            request.scenario_id,
            response.run.results.len()
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = SimulatorClient::new("http://localhost:8000/api/");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/scenarios"), "http://localhost:8000/api/scenarios");
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_generic_message() {
        // Port 9 on localhost is closed in test environments.
        let client = SimulatorClient::new("http://127.0.0.1:9/api");
        let err = client.list_scenarios().await.unwrap_err();
        assert_eq!(err.to_string(), LIST_FAILED);
    }
}
