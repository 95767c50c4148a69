//! Wire types for the simulation backend's three endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::deserializers::{de_id, de_id_list, de_option_i64_forgiving};

/// One row of `GET /scenarios`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Option<ScenarioConfig>,
}

/// `GET /scenarios/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub config: ScenarioConfig,
}

impl ScenarioDetail {
    /// Scenario type tag, preferring the config's own `type`.
    pub fn type_tag(&self) -> Option<&str> {
        self.config.kind.as_deref().or(self.kind.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub default_params: DefaultParams,
    #[serde(default)]
    pub metrics: MetricsSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultParams {
    #[serde(default, deserialize_with = "de_option_i64_forgiving")]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSpec {
    #[serde(default)]
    pub utility_features: Vec<String>,
}

/// Opaque scenario record. Only `id` is interpreted; it is always a string here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        if key == "id" {
            None
        } else {
            self.attributes.get(key)
        }
    }

    /// Display text for a column, `-` when absent or null.
    pub fn display(&self, key: &str) -> String {
        if key == "id" {
            return self.id.clone();
        }
        match self.attributes.get(key) {
            None | Some(Value::Null) => "-".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Parameters sent with a simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub top_k: i64,
    pub weights: BTreeMap<String, f64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            top_k: 10,
            weights: BTreeMap::from([
                ("experience".to_string(), 0.5),
                ("test_score".to_string(), 0.5),
            ]),
        }
    }
}

/// `POST /simulate` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub scenario_id: i64,
    pub frameworks: Vec<String>,
    pub params: SimulationParams,
}

/// `POST /simulate` response; everything but `run.results` is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub run: RunPayload,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub descriptions: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub results: Vec<RawFrameworkResult>,
}

/// A framework result as sent by the backend, before tag validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFrameworkResult {
    pub framework: String,
    #[serde(default)]
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub decisions: Decisions,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decisions {
    #[serde(default, deserialize_with = "de_id_list")]
    pub selected_ids: Vec<String>,
}

/// Backend comparison against the previous run of the same scenario.
/// Only the sentences are shown; numeric deltas are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub text: Vec<String>,
}
