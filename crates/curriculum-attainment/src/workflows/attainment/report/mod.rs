mod diagnostics;
pub mod views;

pub use diagnostics::{
    Diagnostics, DuplicateIdentifier, ExcludedCourse, IdentifierKind, InvalidAttainment,
    UnknownStrength, UnmatchedCourse,
};
pub use views::{MatchLogEntry, ReconciliationSummary, StrategyCounts};

use super::aggregate::{AggregateResult, IndicatorScore, StrengthStat};
use super::domain::{FactRow, MajorIndicator, StrengthWeights};
use serde::Serialize;

/// Complete result of one reconciliation and aggregation pass.
#[derive(Debug, Clone, Serialize)]
pub struct AttainmentReport {
    pub weights: StrengthWeights,
    pub threshold: f64,
    pub match_log: Vec<MatchLogEntry>,
    pub facts: Vec<FactRow>,
    pub strength_stats: Vec<StrengthStat>,
    pub indicators: Vec<IndicatorScore>,
    pub requirements: Vec<AggregateResult>,
    pub flagged: Vec<MajorIndicator>,
    pub weak_points: Vec<StrengthStat>,
    pub strategies: StrategyCounts,
    pub diagnostics: Diagnostics,
}

impl AttainmentReport {
    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary {
            matrix_courses: self.match_log.len(),
            matched_courses: self.strategies.matched(),
            unmatched_courses: self.strategies.not_found,
            fact_rows: self.facts.len(),
            strategies: self.strategies,
            flagged_requirements: self.flagged.len(),
            warnings: self.diagnostics.warning_count(),
        }
    }

    pub fn requirement(&self, major: MajorIndicator) -> Option<&AggregateResult> {
        self.requirements
            .iter()
            .find(|result| result.major_indicator == major)
    }

    pub fn is_flagged(&self, major: MajorIndicator) -> bool {
        self.flagged.contains(&major)
    }
}
