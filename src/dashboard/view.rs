use serde_json::Value;

use super::{DashboardState, RunOutcome};
use crate::frameworks::{Framework, FrameworkResult};
use crate::results::compare::{ComparisonRow, comparison_rows};
use crate::results::narrative;
use crate::results::normalize::{FallbackPolicy, clamp_unit, normalize, round_percent, tradeoff_series};
use crate::results::selection::{
    RecordsPreview, SelectedRow, records_preview, selected_rows, selected_table_limit,
};
use crate::results::{Winners, build_selection_sets, result_winners, summary_insight};
use crate::scenario::ScenarioKind;
use crate::schemas::Entity;

/// One metric bar: clamped score plus the wording shown beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBar {
    pub framework: Framework,
    pub label: String,
    pub description: String,
    pub value: f64,
    pub percent: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiTile {
    pub framework: Framework,
    pub label: String,
    pub percent: i64,
}

/// Raw metrics and explanation for one framework result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationPanel {
    pub framework: Framework,
    pub title: String,
    pub metrics_json: String,
    pub explanation: Option<String>,
}

/// Everything the presentation layer renders, derived from one state snapshot.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub kind: ScenarioKind,
    pub has_results: bool,
    pub bars: Vec<MetricBar>,
    /// Empty until a run produced results.
    pub kpis: Vec<KpiTile>,
    pub winners: Winners,
    pub comparison_rows: Vec<ComparisonRow>,
    pub summary_insight: String,
    pub narrative: Vec<String>,
    pub comparison_text: Vec<String>,
    pub tradeoff: Vec<(Framework, f64)>,
    pub explanations: Vec<ExplanationPanel>,
    /// Only filled for hiring scenarios.
    pub selected: Vec<SelectedRow>,
    pub records: RecordsPreview,
    pub record_columns: &'static [&'static str],
    pub error: Option<String>,
}

fn bar_label(run: Option<&RunOutcome>, kind: Option<ScenarioKind>, fw: Framework) -> String {
    if let Some(label) = run.and_then(|r| r.labels.get(fw.as_str())) {
        return label.clone();
    }
    match kind {
        Some(kind) => kind.default_label(fw).to_string(),
        None => fw.legend().to_string(),
    }
}

fn bar_description(run: Option<&RunOutcome>, kind: Option<ScenarioKind>, fw: Framework) -> String {
    if let Some(text) = run.and_then(|r| r.descriptions.get(fw.as_str())) {
        return text.clone();
    }
    match kind {
        Some(kind) => kind.default_description(fw).to_string(),
        None => fw.legend_explanation().to_string(),
    }
}

fn explanation_panel(result: &FrameworkResult) -> ExplanationPanel {
    let metrics = Value::Object(result.raw_metrics.clone());
    ExplanationPanel {
        framework: result.framework,
        title: result.framework.spaced_tag(),
        metrics_json: serde_json::to_string_pretty(&metrics).unwrap_or_else(|_| metrics.to_string()),
        explanation: result.explanation.clone(),
    }
}

impl DashboardView {
    pub fn build(state: &DashboardState) -> Self {
        let run = state.last_run.as_ref();
        let results = state.results();
        let top_k = state.params.top_k;
        let detail_kind = state
            .detail
            .as_ref()
            .map(|d| ScenarioKind::from_tag(d.type_tag()));
        let kind = detail_kind.unwrap_or_default();

        let bar_scores = normalize(results, top_k, &FallbackPolicy::METRIC_BARS);
        let bars = Framework::ALL
            .iter()
            .map(|&fw| {
                let value = clamp_unit(bar_scores.get(fw));
                MetricBar {
                    framework: fw,
                    label: bar_label(run, detail_kind, fw),
                    description: bar_description(run, detail_kind, fw),
                    value,
                    percent: round_percent(value),
                }
            })
            .collect();

        let kpi_scores = normalize(results, top_k, &FallbackPolicy::KPI_STRIP);
        let kpis = if results.is_empty() {
            Vec::new()
        } else {
            Framework::ALL
                .iter()
                .map(|&fw| KpiTile {
                    framework: fw,
                    label: run
                        .and_then(|r| r.labels.get(fw.as_str()).cloned())
                        .unwrap_or_else(|| fw.display_name().to_string()),
                    percent: round_percent(kpi_scores.get(fw)),
                })
                .collect()
        };

        let winners = result_winners(results);
        let comparison_text: Vec<String> = run
            .map(|r| r.comparison_text().to_vec())
            .unwrap_or_default();
        let narrative_scores = normalize(results, top_k, &FallbackPolicy::NARRATIVE);
        let narrative =
            narrative::compose(kind, narrative_scores.percents(), &comparison_text).collect();

        let sets = build_selection_sets(results);
        let entities: &[Entity] = state
            .detail
            .as_ref()
            .map(|d| d.config.entities.as_slice())
            .unwrap_or(&[]);
        let selected = if kind == ScenarioKind::Hiring {
            selected_rows(entities, &sets, &state.sort, selected_table_limit(top_k))
        } else {
            Vec::new()
        };
        let records = records_preview(
            entities,
            sets.get(Framework::Utilitarian),
            state.records_limit,
            state.show_all_records,
        );

        DashboardView {
            kind,
            has_results: !results.is_empty(),
            bars,
            kpis,
            winners,
            comparison_rows: comparison_rows(&winners),
            summary_insight: summary_insight(&kpi_scores),
            narrative,
            comparison_text,
            tradeoff: tradeoff_series(results),
            explanations: results.iter().map(explanation_panel).collect(),
            selected,
            records,
            record_columns: kind.record_columns(),
            error: state.error.clone(),
        }
    }
}
