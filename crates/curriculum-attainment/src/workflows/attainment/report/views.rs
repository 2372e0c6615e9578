use super::super::matcher::{MatchResult, MatchStrategy};
use serde::Serialize;

/// One row of the match log, describing how a matrix course was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLogEntry {
    pub matrix_code: String,
    pub matrix_name: String,
    pub match_strategy: String,
    pub matched_code: String,
    pub matched_name: String,
    pub attainment: Option<f64>,
}

impl From<&MatchResult<'_>> for MatchLogEntry {
    fn from(result: &MatchResult<'_>) -> Self {
        let (matched_code, matched_name, attainment) = match result.record {
            Some(record) => (
                record.raw_code.clone(),
                record.raw_name.clone(),
                record.attainment,
            ),
            None => (String::new(), String::new(), None),
        };

        Self {
            matrix_code: result.matrix_row.raw_code.clone(),
            matrix_name: result.matrix_row.raw_name.clone(),
            match_strategy: result.strategy.label(),
            matched_code,
            matched_name,
            attainment,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyCounts {
    pub code_exact: usize,
    pub code_padded: usize,
    pub name_exact: usize,
    pub fuzzy_name: usize,
    pub not_found: usize,
}

impl StrategyCounts {
    pub(crate) fn record(&mut self, strategy: &MatchStrategy) {
        match strategy {
            MatchStrategy::CodeExact => self.code_exact += 1,
            MatchStrategy::CodePadded => self.code_padded += 1,
            MatchStrategy::NameExact => self.name_exact += 1,
            MatchStrategy::FuzzyName { .. } => self.fuzzy_name += 1,
            MatchStrategy::NotFound => self.not_found += 1,
        }
    }

    pub fn matched(&self) -> usize {
        self.code_exact + self.code_padded + self.name_exact + self.fuzzy_name
    }
}

/// Headline numbers for a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationSummary {
    pub matrix_courses: usize,
    pub matched_courses: usize,
    pub unmatched_courses: usize,
    pub fact_rows: usize,
    pub strategies: StrategyCounts,
    pub flagged_requirements: usize,
    pub warnings: usize,
}
