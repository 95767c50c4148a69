//! Scenario kinds and the per-kind wording, columns and parameter setup.

use std::collections::BTreeMap;

use crate::frameworks::Framework;
use crate::schemas::{ScenarioDetail, ScenarioSummary, SimulationParams};

/// Seeded demo scenario that the listing hides.
pub const HIDDEN_SCENARIO_NAME: &str = "Hiring Bias Demo";
/// Weight every utility feature starts at before defaults are applied.
pub const FEATURE_WEIGHT_DEFAULT: f64 = 0.5;
pub const TOP_K_DEFAULT: i64 = 10;
pub const TOP_K_MIN: i64 = 1;
pub const TOP_K_MAX: i64 = 50;
pub const WEIGHT_MIN: f64 = -1.0;
pub const WEIGHT_MAX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScenarioKind {
    Hiring,
    Healthcare,
    SelfDriving,
    #[default]
    Generic,
}

impl ScenarioKind {
    /// Any tag other than the three known ones, or none, is `Generic`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("hiring") => ScenarioKind::Hiring,
            Some("healthcare") => ScenarioKind::Healthcare,
            Some("self_driving") => ScenarioKind::SelfDriving,
            _ => ScenarioKind::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Hiring => "hiring",
            ScenarioKind::Healthcare => "healthcare",
            ScenarioKind::SelfDriving => "self_driving",
            ScenarioKind::Generic => "generic",
        }
    }

    /// Objective label for a framework when the run response has none.
    pub fn default_label(&self, framework: Framework) -> &'static str {
        match (self, framework) {
            (ScenarioKind::Hiring, Framework::Utilitarian) => "Performance",
            (ScenarioKind::Hiring, Framework::Fairness) => "Fairness",
            (ScenarioKind::Hiring, Framework::RuleBased) => "Rule Compliance",
            (ScenarioKind::Healthcare, Framework::Utilitarian) => "Accuracy",
            (ScenarioKind::Healthcare, Framework::Fairness) => "Bias Mitigation",
            (ScenarioKind::Healthcare, Framework::RuleBased) => "Patient Safety",
            (_, Framework::Utilitarian) => "Safety Score",
            (_, Framework::Fairness) => "Ethical Decision Balance",
            (_, Framework::RuleBased) => "Law Compliance",
        }
    }

    pub fn default_description(&self, framework: Framework) -> &'static str {
        match (self, framework) {
            (ScenarioKind::Hiring, Framework::Utilitarian) => {
                "Higher means stronger overall candidate performance."
            }
            (ScenarioKind::Hiring, Framework::Fairness) => {
                "Higher means more equal selection across gender/department."
            }
            (ScenarioKind::Hiring, Framework::RuleBased) => {
                "Higher means more selections satisfied policy constraints."
            }
            (ScenarioKind::Healthcare, Framework::Utilitarian) => {
                "Higher means better clinical prioritization accuracy."
            }
            (ScenarioKind::Healthcare, Framework::Fairness) => {
                "Higher means less disparity across income groups."
            }
            (ScenarioKind::Healthcare, Framework::RuleBased) => {
                "Higher means safer allocations under rules."
            }
            (_, Framework::Utilitarian) => "Higher means lower overall harm risk.",
            (_, Framework::Fairness) => "Higher means balanced choices across groups.",
            (_, Framework::RuleBased) => {
                "Higher means more decisions follow safety laws/constraints."
            }
        }
    }

    /// Columns of the records preview table.
    pub fn record_columns(&self) -> &'static [&'static str] {
        match self {
            ScenarioKind::Healthcare => &["id", "age", "severity", "priority", "income_group"],
            ScenarioKind::SelfDriving => &[
                "id",
                "passenger_age",
                "pedestrian_age",
                "risk_level",
                "group",
            ],
            _ => &[
                "id",
                "name",
                "gender",
                "department",
                "experience",
                "test_score",
            ],
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenario listing as shown to the user.
pub fn visible_scenarios(all: Vec<ScenarioSummary>) -> Vec<ScenarioSummary> {
    all.into_iter()
        .filter(|s| s.name != HIDDEN_SCENARIO_NAME)
        .collect()
}

/// Parameters after selecting `detail`.
///
/// Every utility feature starts at [`FEATURE_WEIGHT_DEFAULT`], then the
/// scenario's default weights are laid over it. The current parameters are
/// kept when they already carry every one of those keys; otherwise the weights
/// are replaced and `top_k` keeps its current value.
pub fn init_params(detail: &ScenarioDetail, current: &SimulationParams) -> SimulationParams {
    let config = &detail.config;
    let mut base: BTreeMap<String, f64> = config
        .metrics
        .utility_features
        .iter()
        .map(|k| (k.clone(), FEATURE_WEIGHT_DEFAULT))
        .collect();
    if let Some(weights) = &config.default_params.weights {
        for (k, v) in weights {
            base.insert(k.clone(), clamp_weight(*v));
        }
    }

    let covered = base.keys().all(|k| current.weights.contains_key(k));
    if covered {
        return current.clone();
    }

    let top_k = if current.top_k > 0 {
        current.top_k
    } else {
        config.default_params.top_k.unwrap_or(TOP_K_DEFAULT)
    };
    SimulationParams {
        top_k: clamp_top_k(top_k),
        weights: base,
    }
}

/// Clamp to [`TOP_K_MIN`, `TOP_K_MAX`].
pub fn clamp_top_k(top_k: i64) -> i64 {
    top_k.clamp(TOP_K_MIN, TOP_K_MAX)
}

/// Clamp to [-1, 1]; NaN reads as 0.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(WEIGHT_MIN, WEIGHT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(v: serde_json::Value) -> ScenarioDetail {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_kind_from_tag_defaults_to_generic() {
        assert_eq!(ScenarioKind::from_tag(Some("healthcare")), ScenarioKind::Healthcare);
        assert_eq!(ScenarioKind::from_tag(Some("self_driving")), ScenarioKind::SelfDriving);
        assert_eq!(ScenarioKind::from_tag(Some("lending")), ScenarioKind::Generic);
        assert_eq!(ScenarioKind::from_tag(None), ScenarioKind::Generic);
    }

    #[test]
    fn test_default_labels_per_kind() {
        assert_eq!(
            ScenarioKind::Hiring.default_label(Framework::RuleBased),
            "Rule Compliance"
        );
        assert_eq!(
            ScenarioKind::Healthcare.default_label(Framework::Fairness),
            "Bias Mitigation"
        );
        assert_eq!(
            ScenarioKind::SelfDriving.default_label(Framework::Fairness),
            "Ethical Decision Balance"
        );
        assert_eq!(
            ScenarioKind::Generic.default_description(Framework::Utilitarian),
            "Higher means lower overall harm risk."
        );
    }

    #[test]
    fn test_record_columns() {
        assert_eq!(ScenarioKind::Healthcare.record_columns()[2], "severity");
        assert_eq!(ScenarioKind::Hiring.record_columns().len(), 6);
        assert_eq!(ScenarioKind::SelfDriving.record_columns()[4], "group");
    }

    #[test]
    fn test_demo_scenario_is_hidden() {
        let all: Vec<ScenarioSummary> = serde_json::from_value(json!([
            {"id": 1, "name": "Hiring Bias Demo", "type": "hiring"},
            {"id": 2, "name": "ER Triage", "type": "healthcare"}
        ]))
        .unwrap();
        let visible = visible_scenarios(all);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);
    }

    #[test]
    fn test_init_params_overlays_defaults() {
        let d = detail(json!({"config": {
            "type": "hiring",
            "default_params": {"top_k": 5, "weights": {"experience": 0.8, "bonus": 3.0}},
            "metrics": {"utility_features": ["experience", "test_score"]}
        }}));
        let current = SimulationParams {
            top_k: 7,
            weights: BTreeMap::new(),
        };
        let params = init_params(&d, &current);
        assert_eq!(params.top_k, 7);
        assert_eq!(params.weights["experience"], 0.8);
        assert_eq!(params.weights["test_score"], 0.5);
        assert_eq!(params.weights["bonus"], 1.0);
    }

    #[test]
    fn test_init_params_keeps_covering_weights() {
        let d = detail(json!({"config": {
            "metrics": {"utility_features": ["experience", "test_score"]}
        }}));
        let current = SimulationParams {
            top_k: 3,
            weights: BTreeMap::from([
                ("experience".to_string(), 0.1),
                ("test_score".to_string(), 0.9),
            ]),
        };
        assert_eq!(init_params(&d, &current), current);
    }

    #[test]
    fn test_init_params_uses_scenario_top_k_when_current_unset() {
        let d = detail(json!({"config": {
            "default_params": {"top_k": 5},
            "metrics": {"utility_features": ["age"]}
        }}));
        let current = SimulationParams {
            top_k: 0,
            weights: BTreeMap::new(),
        };
        assert_eq!(init_params(&d, &current).top_k, 5);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(clamp_top_k(0), 1);
        assert_eq!(clamp_top_k(99), 50);
        assert_eq!(clamp_weight(-2.0), -1.0);
        assert_eq!(clamp_weight(f64::NAN), 0.0);
        assert_eq!(clamp_weight(0.3), 0.3);
    }
}
