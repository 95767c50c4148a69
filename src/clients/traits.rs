use async_trait::async_trait;

use crate::error::Result;
use crate::schemas::{ScenarioDetail, ScenarioSummary, SimulateRequest, SimulateResponse};

/// The remote simulation backend: list, inspect and run scenarios.
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    async fn list_scenarios(&self) -> Result<Vec<ScenarioSummary>>;

    async fn get_scenario(&self, id: i64) -> Result<ScenarioDetail>;

    async fn simulate(&self, request: &SimulateRequest) -> Result<SimulateResponse>;
}
