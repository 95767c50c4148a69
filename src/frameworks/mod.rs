//! The three decision frameworks compared by the dashboard.

use serde::{Deserialize, Serialize};

pub mod metrics;

pub use metrics::{
    FairnessMetrics, FrameworkMetrics, FrameworkResult, RuleBasedMetrics, UtilitarianMetrics,
};

/// Closed set of framework tags. Order of `ALL` is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    Utilitarian,
    Fairness,
    RuleBased,
}

impl Framework {
    pub const ALL: [Framework; 3] = [
        Framework::Utilitarian,
        Framework::Fairness,
        Framework::RuleBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Utilitarian => "utilitarian",
            Framework::Fairness => "fairness",
            Framework::RuleBased => "rule_based",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None` so callers can skip them.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "utilitarian" => Some(Framework::Utilitarian),
            "fairness" => Some(Framework::Fairness),
            "rule_based" => Some(Framework::RuleBased),
            _ => None,
        }
    }

    /// Short name used in the summary insight line.
    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Utilitarian => "Utilitarian",
            Framework::Fairness => "Fairness",
            Framework::RuleBased => "Rule-based",
        }
    }

    /// Legend shown on metric bars when the backend sent no labels.
    pub fn legend(&self) -> &'static str {
        match self {
            Framework::Utilitarian => "Utilitarian (Performance)",
            Framework::Fairness => "Fairness (Balance)",
            Framework::RuleBased => "Rule-based (Constraints)",
        }
    }

    pub fn legend_explanation(&self) -> &'static str {
        match self {
            Framework::Utilitarian => "Utilitarian focuses on maximizing overall performance.",
            Framework::Fairness => {
                "Fairness reflects balance across protected groups (higher is more equal)."
            }
            Framework::RuleBased => "Rule-based enforces hard constraints or ethical rules.",
        }
    }

    /// Tag with the underscore turned into a space, as shown in panels.
    pub fn spaced_tag(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which frameworks the user asked the backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkToggles {
    pub utilitarian: bool,
    pub fairness: bool,
    pub rule_based: bool,
}

impl Default for FrameworkToggles {
    fn default() -> Self {
        Self {
            utilitarian: true,
            fairness: true,
            rule_based: true,
        }
    }
}

impl FrameworkToggles {
    pub fn is_enabled(&self, framework: Framework) -> bool {
        match framework {
            Framework::Utilitarian => self.utilitarian,
            Framework::Fairness => self.fairness,
            Framework::RuleBased => self.rule_based,
        }
    }

    pub fn set(&mut self, framework: Framework, enabled: bool) {
        match framework {
            Framework::Utilitarian => self.utilitarian = enabled,
            Framework::Fairness => self.fairness = enabled,
            Framework::RuleBased => self.rule_based = enabled,
        }
    }

    pub fn toggle(&mut self, framework: Framework) {
        let current = self.is_enabled(framework);
        self.set(framework, !current);
    }

    /// Enabled tags in priority order, as sent in the simulate request.
    pub fn selected(&self) -> Vec<String> {
        Framework::ALL
            .iter()
            .filter(|fw| self.is_enabled(**fw))
            .map(|fw| fw.as_str().to_string())
            .collect()
    }

    /// Build toggles from an explicit list; an empty list enables everything.
    pub fn from_list(frameworks: &[Framework]) -> Self {
        if frameworks.is_empty() {
            return Self::default();
        }
        let mut toggles = Self {
            utilitarian: false,
            fairness: false,
            rule_based: false,
        };
        for fw in frameworks {
            toggles.set(*fw, true);
        }
        toggles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_for_known_frameworks() {
        for fw in Framework::ALL {
            assert_eq!(Framework::from_tag(fw.as_str()), Some(fw));
        }
    }

    #[test]
    fn test_unknown_tag_is_none() {
        assert_eq!(Framework::from_tag("virtue"), None);
        assert_eq!(Framework::from_tag("Utilitarian"), None);
    }

    #[test]
    fn test_toggles_selected_keeps_priority_order() {
        let mut toggles = FrameworkToggles::default();
        toggles.toggle(Framework::Fairness);
        assert_eq!(toggles.selected(), vec!["utilitarian", "rule_based"]);
        toggles.toggle(Framework::Fairness);
        assert_eq!(toggles.selected().len(), 3);
    }

    #[test]
    fn test_toggles_from_list() {
        let toggles = FrameworkToggles::from_list(&[Framework::RuleBased]);
        assert_eq!(toggles.selected(), vec!["rule_based"]);
        assert_eq!(FrameworkToggles::from_list(&[]), FrameworkToggles::default());
    }
}
