//! Mutable dashboard state threaded by the CLI and the TUI.
//!
//! The state owns what the user picked and what the backend last returned.
//! Every rendering goes through [`DashboardState::view`], which recomputes the
//! derived figures from scratch.

use std::collections::BTreeMap;

use crate::clients::SimulationBackend;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::frameworks::{Framework, FrameworkResult, FrameworkToggles};
use crate::results::SortSpec;
use crate::scenario::{self, clamp_top_k, clamp_weight};
use crate::schemas::{
    Comparison, ScenarioDetail, ScenarioSummary, SimulateRequest, SimulateResponse,
    SimulationParams,
};

pub mod view;

pub use view::{DashboardView, ExplanationPanel, KpiTile, MetricBar};

pub const NO_SCENARIO_MESSAGE: &str = "Please select a scenario.";
pub const NO_FRAMEWORK_MESSAGE: &str = "Please select at least one framework.";

/// Parse a `key=value` weight override.
pub fn parse_weight(raw: &str) -> Result<(String, f64)> {
    let invalid = || DashboardError::validation(format!("Invalid weight '{}': expected key=value", raw));
    let (key, value) = raw.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid());
    }
    let value: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok((key.to_string(), value))
}

/// Parse framework tags; an unknown tag is a validation error.
pub fn parse_frameworks(tags: &[String]) -> Result<Vec<Framework>> {
    tags.iter()
        .map(|t| {
            Framework::from_tag(t.trim())
                .ok_or_else(|| DashboardError::validation(format!("Unknown framework '{}'", t)))
        })
        .collect()
}

/// What one successful simulation returned, after tag validation.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub run_id: Option<i64>,
    pub results: Vec<FrameworkResult>,
    pub labels: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
    pub comparison: Option<Comparison>,
}

impl RunOutcome {
    pub fn from_response(response: SimulateResponse) -> Self {
        Self {
            run_id: response.run.id,
            results: FrameworkResult::from_raw_list(&response.run.results),
            labels: response.labels.unwrap_or_default(),
            descriptions: response.descriptions.unwrap_or_default(),
            comparison: response.comparison,
        }
    }

    /// Backend comparison sentences; empty when there is no previous run.
    pub fn comparison_text(&self) -> &[String] {
        self.comparison
            .as_ref()
            .map(|c| c.text.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub scenarios: Vec<ScenarioSummary>,
    pub scenario_id: Option<i64>,
    pub detail: Option<ScenarioDetail>,
    pub params: SimulationParams,
    pub frameworks: FrameworkToggles,
    pub last_run: Option<RunOutcome>,
    pub error: Option<String>,
    pub sort: SortSpec,
    pub records_limit: usize,
    pub show_all_records: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl DashboardState {
    pub fn new(config: &Config) -> Self {
        Self {
            scenarios: Vec::new(),
            scenario_id: None,
            detail: None,
            params: SimulationParams {
                top_k: clamp_top_k(config.defaults.top_k),
                ..SimulationParams::default()
            },
            frameworks: FrameworkToggles::default(),
            last_run: None,
            error: None,
            sort: SortSpec::default(),
            records_limit: config.display.records_limit,
            show_all_records: false,
        }
    }

    /// Record a failure for display and hand it back to the caller.
    fn fail(&mut self, err: DashboardError) -> DashboardError {
        self.error = Some(err.to_string());
        err
    }

    /// Fetch the scenario list, hiding the seeded demo.
    pub async fn load_scenarios(&mut self, backend: &dyn SimulationBackend) -> Result<()> {
        match backend.list_scenarios().await {
            Ok(list) => {
                self.scenarios = scenario::visible_scenarios(list);
                tracing::debug!("Loaded {} scenarios", self.scenarios.len());
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Select a scenario, fetch its detail and initialize parameters from it.
    /// On failure the previous detail is kept.
    pub async fn select_scenario(
        &mut self,
        backend: &dyn SimulationBackend,
        id: i64,
    ) -> Result<()> {
        self.scenario_id = Some(id);
        match backend.get_scenario(id).await {
            Ok(detail) => {
                self.params = scenario::init_params(&detail, &self.params);
                self.detail = Some(detail);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Build the simulate request, or the validation error that stops it.
    pub fn request(&self) -> Result<SimulateRequest> {
        let Some(scenario_id) = self.scenario_id else {
            return Err(DashboardError::validation(NO_SCENARIO_MESSAGE));
        };
        let frameworks = self.frameworks.selected();
        if frameworks.is_empty() {
            return Err(DashboardError::validation(NO_FRAMEWORK_MESSAGE));
        }
        Ok(SimulateRequest {
            scenario_id,
            frameworks,
            params: self.params.clone(),
        })
    }

    /// Run a simulation. A successful response fully replaces the previous
    /// run; a failed one leaves it untouched.
    pub async fn run(&mut self, backend: &dyn SimulationBackend) -> Result<()> {
        let request = match self.request() {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        self.error = None;
        match backend.simulate(&request).await {
            Ok(response) => {
                let outcome = RunOutcome::from_response(response);
                tracing::info!(
                    "Simulation for scenario {} completed with {} framework results",
                    request.scenario_id,
                    outcome.results.len()
                );
                self.last_run = Some(outcome);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Latest validated results, empty before the first run.
    pub fn results(&self) -> &[FrameworkResult] {
        self.last_run
            .as_ref()
            .map(|r| r.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_top_k(&mut self, top_k: i64) {
        self.params.top_k = clamp_top_k(top_k);
    }

    pub fn adjust_top_k(&mut self, delta: i64) {
        self.set_top_k(self.params.top_k.saturating_add(delta));
    }

    pub fn set_weight(&mut self, key: &str, value: f64) {
        self.params.weights.insert(key.to_string(), clamp_weight(value));
    }

    pub fn toggle_framework(&mut self, framework: Framework) {
        self.frameworks.toggle(framework);
    }

    pub fn sort_by(&mut self, key: &str) {
        self.sort.click(key);
    }

    pub fn toggle_show_all_records(&mut self) {
        self.show_all_records = !self.show_all_records;
    }

    pub fn selected_scenario(&self) -> Option<&ScenarioSummary> {
        let id = self.scenario_id?;
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_requires_scenario() {
        let state = DashboardState::default();
        let err = state.request().unwrap_err();
        assert_eq!(err.to_string(), NO_SCENARIO_MESSAGE);
    }

    #[test]
    fn test_request_requires_a_framework() {
        let mut state = DashboardState::default();
        state.scenario_id = Some(1);
        for fw in Framework::ALL {
            state.toggle_framework(fw);
        }
        assert_eq!(state.request().unwrap_err().to_string(), NO_FRAMEWORK_MESSAGE);
        state.toggle_framework(Framework::Fairness);
        assert_eq!(state.request().unwrap().frameworks, vec!["fairness"]);
    }

    #[test]
    fn test_param_edits_are_clamped() {
        let mut state = DashboardState::default();
        state.adjust_top_k(100);
        assert_eq!(state.params.top_k, 50);
        state.set_top_k(-3);
        assert_eq!(state.params.top_k, 1);
        state.set_weight("experience", 4.0);
        assert_eq!(state.params.weights["experience"], 1.0);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("experience=0.7").unwrap(), ("experience".to_string(), 0.7));
        assert_eq!(parse_weight(" age = -1 ").unwrap(), ("age".to_string(), -1.0));
        for bad in ["experience", "=0.5", "x=abc", "x=NaN"] {
            assert!(matches!(
                parse_weight(bad),
                Err(DashboardError::Validation { .. })
            ));
        }
    }

    #[test]
    fn test_parse_frameworks() {
        let tags = vec!["fairness".to_string(), "rule_based".to_string()];
        assert_eq!(
            parse_frameworks(&tags).unwrap(),
            vec![Framework::Fairness, Framework::RuleBased]
        );
        let err = parse_frameworks(&["virtue".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown framework 'virtue'");
    }

    #[test]
    fn test_config_defaults_seed_state() {
        let mut config = Config::default();
        config.defaults.top_k = 7;
        config.display.records_limit = 5;
        let state = DashboardState::new(&config);
        assert_eq!(state.params.top_k, 7);
        assert_eq!(state.records_limit, 5);
        assert!(state.results().is_empty());
    }
}
