//! Typed per-framework metric payloads.
//!
//! Each framework reports its own vocabulary. The union below names every
//! field the dashboard reads; anything else stays in `raw` for the export.

use serde_json::{Map, Value};

use super::Framework;
use crate::deserializers::finite_number;
use crate::schemas::RawFrameworkResult;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UtilitarianMetrics {
    pub total_utility: Option<f64>,
    pub avg_utility: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FairnessMetrics {
    pub parity_gap: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleBasedMetrics {
    pub constraint_satisfaction_rate: Option<f64>,
}

/// One payload shape per framework tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameworkMetrics {
    Utilitarian(UtilitarianMetrics),
    Fairness(FairnessMetrics),
    RuleBased(RuleBasedMetrics),
}

impl FrameworkMetrics {
    /// Read the typed fields for `framework` from a raw metric map.
    /// Missing, non-numeric and non-finite values all read as `None`.
    pub fn from_map(framework: Framework, map: &Map<String, Value>) -> Self {
        let num = |key: &str| map.get(key).and_then(finite_number);
        match framework {
            Framework::Utilitarian => FrameworkMetrics::Utilitarian(UtilitarianMetrics {
                total_utility: num("total_utility"),
                avg_utility: num("avg_utility"),
            }),
            Framework::Fairness => FrameworkMetrics::Fairness(FairnessMetrics {
                parity_gap: num("parity_gap"),
            }),
            Framework::RuleBased => FrameworkMetrics::RuleBased(RuleBasedMetrics {
                constraint_satisfaction_rate: num("constraint_satisfaction_rate"),
            }),
        }
    }

    pub fn framework(&self) -> Framework {
        match self {
            FrameworkMetrics::Utilitarian(_) => Framework::Utilitarian,
            FrameworkMetrics::Fairness(_) => Framework::Fairness,
            FrameworkMetrics::RuleBased(_) => Framework::RuleBased,
        }
    }

    pub fn total_utility(&self) -> Option<f64> {
        match self {
            FrameworkMetrics::Utilitarian(m) => m.total_utility,
            _ => None,
        }
    }

    pub fn avg_utility(&self) -> Option<f64> {
        match self {
            FrameworkMetrics::Utilitarian(m) => m.avg_utility,
            _ => None,
        }
    }

    pub fn parity_gap(&self) -> Option<f64> {
        match self {
            FrameworkMetrics::Fairness(m) => m.parity_gap,
            _ => None,
        }
    }

    pub fn constraint_satisfaction_rate(&self) -> Option<f64> {
        match self {
            FrameworkMetrics::RuleBased(m) => m.constraint_satisfaction_rate,
            _ => None,
        }
    }
}

/// A validated framework result from one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkResult {
    pub framework: Framework,
    pub metrics: FrameworkMetrics,
    /// Metric map exactly as the backend sent it, in its key order.
    pub raw_metrics: Map<String, Value>,
    pub selected_ids: Vec<String>,
    pub explanation: Option<String>,
}

impl FrameworkResult {
    /// Validate a wire result. Unknown framework tags yield `None`.
    pub fn from_raw(raw: &RawFrameworkResult) -> Option<Self> {
        let Some(framework) = Framework::from_tag(&raw.framework) else {
            tracing::debug!("Skipping result with unknown framework tag '{}'", raw.framework);
            return None;
        };
        Some(Self {
            framework,
            metrics: FrameworkMetrics::from_map(framework, &raw.metrics),
            raw_metrics: raw.metrics.clone(),
            selected_ids: raw.decisions.selected_ids.clone(),
            explanation: raw.explanation.clone(),
        })
    }

    /// Validate a whole run, dropping unknown tags and keeping input order.
    pub fn from_raw_list(raw: &[RawFrameworkResult]) -> Vec<Self> {
        raw.iter().filter_map(Self::from_raw).collect()
    }

    /// Test and fixture helper: build from a tag and a JSON metric object.
    pub fn with_metrics(framework: Framework, metrics: Value) -> Self {
        let raw_metrics = match metrics {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            framework,
            metrics: FrameworkMetrics::from_map(framework, &raw_metrics),
            raw_metrics,
            selected_ids: Vec::new(),
            explanation: None,
        }
    }
}

/// First result for `framework`, mirroring a find-first lookup.
pub fn find(results: &[FrameworkResult], framework: Framework) -> Option<&FrameworkResult> {
    results.iter().find(|r| r.framework == framework)
}
