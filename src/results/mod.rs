//! Result normalization and comparison engine.
//!
//! Everything here is a pure function of the latest framework results and the
//! scenario config; nothing is cached between runs.

pub mod compare;
pub mod export;
pub mod narrative;
pub mod normalize;
pub mod selection;

pub use compare::{OverallBest, Winners, overall_best, result_winners, summary_insight};
pub use export::{MetricRow, export_rows, write_csv};
pub use normalize::{FallbackPolicy, NormalizedScores, Objective, PercentScores, normalize};
pub use selection::{SelectionSet, SortDirection, SortSpec, build_selection_sets};
