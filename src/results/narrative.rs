//! Scenario-aware narrative lines.

use std::iter;

use super::normalize::PercentScores;
use crate::scenario::ScenarioKind;

/// Headline sentence for `kind` from whole-percent scores.
pub fn headline(kind: ScenarioKind, pct: &PercentScores) -> String {
    let (perf, fair, rule) = (pct.utilitarian, pct.fairness, pct.rule_based);
    match kind {
        ScenarioKind::Healthcare => {
            format!("Accuracy is {perf}%. Patient Safety {rule}%. Bias Mitigation {fair}%.")
        }
        ScenarioKind::SelfDriving => {
            format!("Safety Score is {perf}%. Ethical Balance {fair}%. Law Compliance {rule}%.")
        }
        ScenarioKind::Hiring | ScenarioKind::Generic => {
            format!("Performance is {perf}%. Fairness {fair}%. Rule Compliance {rule}%.")
        }
    }
}

/// Headline followed by the backend's comparison sentences, verbatim.
///
/// Lazy and restartable: cloning the iterator replays the same lines.
pub fn compose<'a>(
    kind: ScenarioKind,
    pct: PercentScores,
    comparison: &'a [String],
) -> impl Iterator<Item = String> + Clone + 'a {
    iter::once_with(move || headline(kind, &pct)).chain(comparison.iter().cloned())
}
