//! Metric normalization: one comparable 0..1 "goodness" score per framework.
//!
//! Call sites disagree on what a missing metric means, so every default is a
//! named constant and callers pick a [`FallbackPolicy`] explicitly.

use crate::frameworks::{Framework, FrameworkResult, metrics::find};

/// Utility assumed when the utilitarian metric is missing.
pub const UTILITY_DEFAULT: f64 = 0.0;
/// Missing parity gap on the metric-bar path: assume perfect parity.
pub const PARITY_GAP_DEFAULT_FOR_BARS: f64 = 0.0;
/// Missing parity gap on the summary path (KPI strip, insight line): assume the worst.
pub const PARITY_GAP_DEFAULT_FOR_SUMMARY: f64 = 1.0;
/// Missing satisfaction rate on the bar and narrative paths: full compliance.
pub const CONSTRAINT_RATE_DEFAULT_FOR_BARS: f64 = 1.0;
/// Missing satisfaction rate on the KPI path: no compliance.
pub const CONSTRAINT_RATE_DEFAULT_FOR_KPI: f64 = 0.0;
/// Badge score for an objective a result does not report; it can never win.
pub const UNREPORTED: f64 = f64::NEG_INFINITY;

/// How the utilitarian score is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilitySource {
    /// `total_utility / max(1, top_k)`
    PerSelection,
    /// `avg_utility` as reported.
    Average,
    /// `total_utility` as reported, unscaled.
    RawTotal,
}

/// Defaults applied by one call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    pub utility_source: UtilitySource,
    pub parity_gap_when_missing: f64,
    pub constraint_rate_when_missing: f64,
    /// Score used for a framework that produced no result at all.
    pub when_absent: NormalizedScores,
}

impl FallbackPolicy {
    /// Metric bars: per-selection utility, optimistic on missing keys,
    /// zero for frameworks without a result.
    pub const METRIC_BARS: FallbackPolicy = FallbackPolicy {
        utility_source: UtilitySource::PerSelection,
        parity_gap_when_missing: PARITY_GAP_DEFAULT_FOR_BARS,
        constraint_rate_when_missing: CONSTRAINT_RATE_DEFAULT_FOR_BARS,
        when_absent: NormalizedScores::splat(0.0),
    };

    /// Narrative line: same scores as the bars, but an absent rule-based
    /// framework is assumed fully compliant.
    pub const NARRATIVE: FallbackPolicy = FallbackPolicy {
        utility_source: UtilitySource::PerSelection,
        parity_gap_when_missing: PARITY_GAP_DEFAULT_FOR_BARS,
        constraint_rate_when_missing: CONSTRAINT_RATE_DEFAULT_FOR_BARS,
        when_absent: NormalizedScores {
            utilitarian: UTILITY_DEFAULT,
            fairness: 0.0,
            rule_based: CONSTRAINT_RATE_DEFAULT_FOR_BARS,
        },
    };

    /// KPI strip and summary insight: reported averages, pessimistic defaults.
    pub const KPI_STRIP: FallbackPolicy = FallbackPolicy {
        utility_source: UtilitySource::Average,
        parity_gap_when_missing: PARITY_GAP_DEFAULT_FOR_SUMMARY,
        constraint_rate_when_missing: CONSTRAINT_RATE_DEFAULT_FOR_KPI,
        when_absent: NormalizedScores {
            utilitarian: UTILITY_DEFAULT,
            fairness: 1.0 - PARITY_GAP_DEFAULT_FOR_SUMMARY,
            rule_based: CONSTRAINT_RATE_DEFAULT_FOR_KPI,
        },
    };

    /// Trade-off chart: raw totals; frameworks without a result are not drawn.
    pub const TRADEOFF: FallbackPolicy = FallbackPolicy {
        utility_source: UtilitySource::RawTotal,
        parity_gap_when_missing: PARITY_GAP_DEFAULT_FOR_BARS,
        constraint_rate_when_missing: CONSTRAINT_RATE_DEFAULT_FOR_BARS,
        when_absent: NormalizedScores::splat(0.0),
    };
}

/// Framework tag → score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScores {
    pub utilitarian: f64,
    pub fairness: f64,
    pub rule_based: f64,
}

impl NormalizedScores {
    pub const fn splat(value: f64) -> Self {
        Self {
            utilitarian: value,
            fairness: value,
            rule_based: value,
        }
    }

    pub fn get(&self, framework: Framework) -> f64 {
        match framework {
            Framework::Utilitarian => self.utilitarian,
            Framework::Fairness => self.fairness,
            Framework::RuleBased => self.rule_based,
        }
    }

    pub fn set(&mut self, framework: Framework, value: f64) {
        match framework {
            Framework::Utilitarian => self.utilitarian = value,
            Framework::Fairness => self.fairness = value,
            Framework::RuleBased => self.rule_based = value,
        }
    }

    /// Scores in priority order.
    pub fn entries(&self) -> [(Framework, f64); 3] {
        Framework::ALL.map(|fw| (fw, self.get(fw)))
    }

    /// Whole percentages, not clamped.
    pub fn percents(&self) -> PercentScores {
        PercentScores {
            utilitarian: round_percent(self.utilitarian),
            fairness: round_percent(self.fairness),
            rule_based: round_percent(self.rule_based),
        }
    }

    /// Whole percentages of the values clamped to [0, 1], as bars show them.
    pub fn clamped_percents(&self) -> PercentScores {
        PercentScores {
            utilitarian: round_percent(clamp_unit(self.utilitarian)),
            fairness: round_percent(clamp_unit(self.fairness)),
            rule_based: round_percent(clamp_unit(self.rule_based)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentScores {
    pub utilitarian: i64,
    pub fairness: i64,
    pub rule_based: i64,
}

impl PercentScores {
    pub fn get(&self, framework: Framework) -> i64 {
        match framework {
            Framework::Utilitarian => self.utilitarian,
            Framework::Fairness => self.fairness,
            Framework::RuleBased => self.rule_based,
        }
    }
}

/// The key objective each framework optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    Performance,
    Balance,
    Compliance,
}

impl Objective {
    pub const ALL: [Objective; 3] = [
        Objective::Performance,
        Objective::Balance,
        Objective::Compliance,
    ];

    pub fn of(framework: Framework) -> Self {
        match framework {
            Framework::Utilitarian => Objective::Performance,
            Framework::Fairness => Objective::Balance,
            Framework::RuleBased => Objective::Compliance,
        }
    }
}

/// One result scored on all three objectives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveScores {
    pub performance: f64,
    pub balance: f64,
    pub compliance: f64,
}

impl ObjectiveScores {
    pub fn get(&self, objective: Objective) -> f64 {
        match objective {
            Objective::Performance => self.performance,
            Objective::Balance => self.balance,
            Objective::Compliance => self.compliance,
        }
    }
}

/// `total_utility / max(1, top_k)`.
pub fn utilitarian_score(total_utility: f64, top_k: i64) -> f64 {
    total_utility / top_k.max(1) as f64
}

/// `1 - parity_gap`.
pub fn fairness_score(parity_gap: f64) -> f64 {
    1.0 - parity_gap
}

/// Score `result` on every objective under `policy`.
pub fn objective_scores(
    result: &FrameworkResult,
    top_k: i64,
    policy: &FallbackPolicy,
) -> ObjectiveScores {
    let m = &result.metrics;
    let performance = match policy.utility_source {
        UtilitySource::PerSelection => {
            utilitarian_score(m.total_utility().unwrap_or(UTILITY_DEFAULT), top_k)
        }
        UtilitySource::Average => m.avg_utility().unwrap_or(UTILITY_DEFAULT),
        UtilitySource::RawTotal => m.total_utility().unwrap_or(UTILITY_DEFAULT),
    };
    ObjectiveScores {
        performance,
        balance: fairness_score(m.parity_gap().unwrap_or(policy.parity_gap_when_missing)),
        compliance: m
            .constraint_satisfaction_rate()
            .unwrap_or(policy.constraint_rate_when_missing),
    }
}

/// Badge scores: only metrics the result actually reports count.
pub fn reported_objective_scores(result: &FrameworkResult) -> ObjectiveScores {
    let m = &result.metrics;
    ObjectiveScores {
        performance: m.avg_utility().unwrap_or(UNREPORTED),
        balance: m.parity_gap().map(fairness_score).unwrap_or(UNREPORTED),
        compliance: m.constraint_satisfaction_rate().unwrap_or(UNREPORTED),
    }
}

/// Score of `result` on its own framework's key objective.
pub fn score_result(result: &FrameworkResult, top_k: i64, policy: &FallbackPolicy) -> f64 {
    objective_scores(result, top_k, policy).get(Objective::of(result.framework))
}

/// Normalized score per framework. The first result for a framework is used;
/// frameworks without a result take `policy.when_absent`.
pub fn normalize(
    results: &[FrameworkResult],
    top_k: i64,
    policy: &FallbackPolicy,
) -> NormalizedScores {
    let mut scores = policy.when_absent;
    for fw in Framework::ALL {
        if let Some(result) = find(results, fw) {
            scores.set(fw, score_result(result, top_k, policy));
        }
    }
    scores
}

/// Trade-off chart series: one bar per result, in input order.
pub fn tradeoff_series(results: &[FrameworkResult]) -> Vec<(Framework, f64)> {
    results
        .iter()
        .map(|r| (r.framework, score_result(r, 1, &FallbackPolicy::TRADEOFF)))
        .collect()
}

/// Clamp to [0, 1]; NaN reads as 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Whole percent with half-up rounding (`0.125` → 13, `-0.125` → -12).
pub fn round_percent(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value * 100.0 + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn util(total: f64) -> FrameworkResult {
        FrameworkResult::with_metrics(Framework::Utilitarian, json!({"total_utility": total}))
    }

    #[test]
    fn test_utilitarian_divides_by_top_k() {
        assert!((utilitarian_score(7.0, 10) - 0.7).abs() < 1e-12);
        assert_eq!(utilitarian_score(5.0, 1), 5.0);
    }

    #[test]
    fn test_utilitarian_guards_non_positive_top_k() {
        assert_eq!(utilitarian_score(3.5, 0), 3.5);
        assert_eq!(utilitarian_score(3.5, -4), 3.5);
    }

    #[test]
    fn test_fairness_is_monotonically_decreasing() {
        let gaps = [0.0, 0.1, 0.25, 0.5, 0.9, 1.0];
        for pair in gaps.windows(2) {
            assert!(fairness_score(pair[0]) > fairness_score(pair[1]));
        }
        assert_eq!(fairness_score(0.0), 1.0);
        assert_eq!(fairness_score(1.0), 0.0);
    }

    #[test]
    fn test_missing_parity_gap_differs_by_policy() {
        let r = FrameworkResult::with_metrics(Framework::Fairness, json!({}));
        assert_eq!(score_result(&r, 10, &FallbackPolicy::METRIC_BARS), 1.0);
        assert_eq!(score_result(&r, 10, &FallbackPolicy::KPI_STRIP), 0.0);
    }

    #[test]
    fn test_missing_constraint_rate_differs_by_policy() {
        let r = FrameworkResult::with_metrics(Framework::RuleBased, json!({}));
        assert_eq!(score_result(&r, 10, &FallbackPolicy::METRIC_BARS), 1.0);
        assert_eq!(score_result(&r, 10, &FallbackPolicy::NARRATIVE), 1.0);
        assert_eq!(score_result(&r, 10, &FallbackPolicy::KPI_STRIP), 0.0);
    }

    #[test]
    fn test_non_finite_metric_uses_fallback() {
        let r = FrameworkResult::with_metrics(
            Framework::Utilitarian,
            json!({"total_utility": "Infinity", "avg_utility": null}),
        );
        assert_eq!(score_result(&r, 10, &FallbackPolicy::METRIC_BARS), 0.0);
        assert_eq!(score_result(&r, 10, &FallbackPolicy::KPI_STRIP), 0.0);
    }

    #[test]
    fn test_normalize_is_not_clamped() {
        let scores = normalize(&[util(25.0)], 10, &FallbackPolicy::METRIC_BARS);
        assert_eq!(scores.utilitarian, 2.5);
        assert_eq!(scores.clamped_percents().utilitarian, 100);
        assert_eq!(scores.percents().utilitarian, 250);
    }

    #[test]
    fn test_absent_frameworks_take_policy_defaults() {
        let bars = normalize(&[], 10, &FallbackPolicy::METRIC_BARS);
        assert_eq!(bars, NormalizedScores::splat(0.0));
        let narrative = normalize(&[], 10, &FallbackPolicy::NARRATIVE);
        assert_eq!(narrative.rule_based, 1.0);
        assert_eq!(narrative.fairness, 0.0);
        let kpi = normalize(&[], 10, &FallbackPolicy::KPI_STRIP);
        assert_eq!(kpi, NormalizedScores::splat(0.0));
    }

    #[test]
    fn test_reported_objective_scores() {
        let r = FrameworkResult::with_metrics(
            Framework::Utilitarian,
            json!({"total_utility": 7.0, "avg_utility": 0.7}),
        );
        let s = reported_objective_scores(&r);
        assert_eq!(s.performance, 0.7);
        assert_eq!(s.balance, UNREPORTED);
        assert_eq!(s.compliance, UNREPORTED);

        let f = FrameworkResult::with_metrics(Framework::Fairness, json!({"parity_gap": 0.25}));
        assert_eq!(reported_objective_scores(&f).balance, 0.75);
    }

    #[test]
    fn test_objective_scores_fill_every_objective() {
        let r = FrameworkResult::with_metrics(Framework::Utilitarian, json!({"total_utility": 4.0}));
        let s = objective_scores(&r, 8, &FallbackPolicy::METRIC_BARS);
        assert_eq!(s.performance, 0.5);
        assert_eq!(s.balance, 1.0);
        assert_eq!(s.compliance, 1.0);
    }

    #[test]
    fn test_tradeoff_series_keeps_input_order() {
        let results = vec![
            FrameworkResult::with_metrics(Framework::RuleBased, json!({})),
            util(7.0),
        ];
        let series = tradeoff_series(&results);
        assert_eq!(series, vec![(Framework::RuleBased, 1.0), (Framework::Utilitarian, 7.0)]);
    }

    #[test]
    fn test_round_percent_is_half_up() {
        assert_eq!(round_percent(0.7), 70);
        assert_eq!(round_percent(0.125), 13);
        assert_eq!(round_percent(-0.125), -12);
        assert_eq!(round_percent(f64::NAN), 0);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.3), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }
}
