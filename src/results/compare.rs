//! Winner badges and the overall-best line.

use super::normalize::{
    NormalizedScores, Objective, ObjectiveScores, reported_objective_scores, round_percent,
};
use crate::frameworks::{Framework, FrameworkResult};

/// Per-objective winners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Winners {
    pub best_performance: Framework,
    pub most_balanced: Framework,
    pub most_compliant: Framework,
}

impl Default for Winners {
    fn default() -> Self {
        Self {
            best_performance: Framework::Utilitarian,
            most_balanced: Framework::Fairness,
            most_compliant: Framework::RuleBased,
        }
    }
}

impl Winners {
    pub fn get(&self, objective: Objective) -> Framework {
        match objective {
            Objective::Performance => self.best_performance,
            Objective::Balance => self.most_balanced,
            Objective::Compliance => self.most_compliant,
        }
    }

    /// Badges `framework` earned, in objective order.
    pub fn badges_for(&self, framework: Framework) -> Vec<Objective> {
        Objective::ALL
            .into_iter()
            .filter(|o| self.get(*o) == framework)
            .collect()
    }
}

/// Linear scan keeping the strictly greatest score per objective. Seeds start
/// at negative infinity, so ties go to the earlier entry and an empty input
/// yields the default winners.
pub fn pick_winners<I>(entries: I) -> Winners
where
    I: IntoIterator<Item = (Framework, ObjectiveScores)>,
{
    let mut winners = Winners::default();
    let mut best = ObjectiveScores {
        performance: f64::NEG_INFINITY,
        balance: f64::NEG_INFINITY,
        compliance: f64::NEG_INFINITY,
    };
    for (framework, scores) in entries {
        if scores.performance > best.performance {
            best.performance = scores.performance;
            winners.best_performance = framework;
        }
        if scores.balance > best.balance {
            best.balance = scores.balance;
            winners.most_balanced = framework;
        }
        if scores.compliance > best.compliance {
            best.compliance = scores.compliance;
            winners.most_compliant = framework;
        }
    }
    winners
}

/// Badge winners for a run. A result only competes on objectives it reports,
/// so a framework missing from the run keeps its seed badge.
pub fn result_winners(results: &[FrameworkResult]) -> Winners {
    pick_winners(
        results
            .iter()
            .map(|r| (r.framework, reported_objective_scores(r))),
    )
}

/// The framework whose own key objective scored highest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverallBest {
    pub framework: Framework,
    pub score: f64,
}

/// `max(perf, fairness, rule)` mapped back by equality in priority order.
pub fn overall_best(scores: &NormalizedScores) -> OverallBest {
    let best = scores
        .utilitarian
        .max(scores.fairness)
        .max(scores.rule_based);
    let framework = if best == scores.utilitarian {
        Framework::Utilitarian
    } else if best == scores.fairness {
        Framework::Fairness
    } else {
        Framework::RuleBased
    };
    OverallBest {
        framework,
        score: best,
    }
}

/// `Best Decision Framework: <name> (<pct>% on its key objective)`
pub fn summary_insight(scores: &NormalizedScores) -> String {
    let best = overall_best(scores);
    format!(
        "Best Decision Framework: {} ({}% on its key objective)",
        best.framework.display_name(),
        round_percent(best.score)
    )
}

/// Static trade-off notes shown beside the badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkProfile {
    pub framework: Framework,
    pub strength: &'static str,
    pub weakness: &'static str,
}

pub const PROFILES: [FrameworkProfile; 3] = [
    FrameworkProfile {
        framework: Framework::Utilitarian,
        strength: "High performance",
        weakness: "May favor majority group",
    },
    FrameworkProfile {
        framework: Framework::Fairness,
        strength: "Balanced selection",
        weakness: "Slightly lower utility",
    },
    FrameworkProfile {
        framework: Framework::RuleBased,
        strength: "Enforces constraints",
        weakness: "May exclude qualified edge cases",
    },
];

pub fn badge_label(objective: Objective) -> &'static str {
    match objective {
        Objective::Performance => "Best overall performer",
        Objective::Balance => "Most balanced",
        Objective::Compliance => "Most ethical",
    }
}

/// One row of the comparison summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub profile: FrameworkProfile,
    pub badges: Vec<Objective>,
}

pub fn comparison_rows(winners: &Winners) -> Vec<ComparisonRow> {
    PROFILES
        .iter()
        .map(|p| ComparisonRow {
            profile: *p,
            badges: winners.badges_for(p.framework),
        })
        .collect()
}
