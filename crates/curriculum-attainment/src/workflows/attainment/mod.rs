//! Course reconciliation and weighted attainment aggregation.
//!
//! A pass runs normalizer → matcher → fact builder → aggregator → threshold
//! evaluator over two parsed tables and returns an [`AttainmentReport`].
//! Nothing is kept between passes.

pub mod aggregate;
pub mod domain;
pub mod facts;
pub mod matcher;
pub mod normalizer;
pub mod parser;
pub mod report;
mod similarity;
pub mod threshold;

pub use aggregate::{aggregate, AggregateResult, AttainmentAggregates, IndicatorScore, StrengthStat};
pub use domain::{
    CourseScoreRecord, FactRow, IndicatorId, MajorIndicator, MatrixRow, Strength, StrengthWeights,
};
pub use facts::{build_facts, FactTable};
pub use matcher::{match_courses, MatchOptions, MatchResult, MatchStrategy};
pub use parser::{parse_matrix, parse_scores, InputTable, MatrixDataset, ScoreDataset, SchemaError};
pub use report::{AttainmentReport, Diagnostics, MatchLogEntry, ReconciliationSummary};
pub use similarity::similarity_ratio;

use crate::config::AnalysisConfig;
use parser::ParseError;
use report::{StrategyCounts, UnmatchedCourse};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum AttainmentImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Schema(SchemaError),
}

impl std::fmt::Display for AttainmentImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttainmentImportError::Io(err) => write!(f, "failed to read input table: {}", err),
            AttainmentImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            AttainmentImportError::Schema(err) => write!(f, "missing input: {}", err),
        }
    }
}

impl std::error::Error for AttainmentImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttainmentImportError::Io(err) => Some(err),
            AttainmentImportError::Csv(err) => Some(err),
            AttainmentImportError::Schema(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for AttainmentImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AttainmentImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<SchemaError> for AttainmentImportError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<ParseError> for AttainmentImportError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Csv(err) => Self::Csv(err),
            ParseError::Schema(err) => Self::Schema(err),
        }
    }
}

/// Runs reconciliation and aggregation with an explicit configuration.
#[derive(Debug, Clone)]
pub struct AttainmentPipeline {
    config: AnalysisConfig,
}

impl AttainmentPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(
        &self,
        scores: &ScoreDataset,
        matrix: &MatrixDataset,
    ) -> Result<AttainmentReport, SchemaError> {
        if scores.records.is_empty() {
            return Err(SchemaError::EmptyTable {
                table: InputTable::Scores,
            });
        }
        if matrix.rows.is_empty() {
            return Err(SchemaError::EmptyTable {
                table: InputTable::Matrix,
            });
        }

        let (matches, duplicates) =
            match_courses(&matrix.rows, &scores.records, self.config.match_options());

        let mut strategies = StrategyCounts::default();
        let mut unmatched = Vec::new();
        for result in &matches {
            strategies.record(&result.strategy);
            if !result.strategy.is_found() {
                warn!(
                    code = %result.matrix_row.raw_code,
                    name = %result.matrix_row.raw_name,
                    "matrix course has no attainment score"
                );
                unmatched.push(UnmatchedCourse {
                    code: result.matrix_row.raw_code.clone(),
                    name: result.matrix_row.raw_name.clone(),
                });
            }
        }
        info!(
            code_exact = strategies.code_exact,
            code_padded = strategies.code_padded,
            name_exact = strategies.name_exact,
            fuzzy_name = strategies.fuzzy_name,
            not_found = strategies.not_found,
            "matched support matrix against score dataset"
        );

        let match_log = matches.iter().map(MatchLogEntry::from).collect();
        let facts = build_facts(&matches);
        let aggregates = aggregate(&facts.rows, &self.config.weights);
        let flagged = threshold::evaluate(&aggregates.requirements, self.config.threshold);
        let weak_points = threshold::weak_points(&aggregates.strength_stats, self.config.threshold);

        for major in &flagged {
            if let Some(result) = aggregates
                .requirements
                .iter()
                .find(|result| result.major_indicator == *major)
            {
                warn!(
                    requirement = %major,
                    score = result.composite_score,
                    threshold = self.config.threshold,
                    "graduation requirement below attainment threshold"
                );
            }
        }

        let diagnostics = Diagnostics {
            unmatched,
            duplicates,
            invalid_attainment: scores.invalid_attainment.clone(),
            excluded: facts.excluded,
            unknown_strengths: matrix.unknown_strengths.clone(),
            degenerate_indicators: aggregates.degenerate_indicators,
        };

        Ok(AttainmentReport {
            weights: self.config.weights,
            threshold: self.config.threshold,
            match_log,
            facts: facts.rows,
            strength_stats: aggregates.strength_stats,
            indicators: aggregates.indicators,
            requirements: aggregates.requirements,
            flagged,
            weak_points,
            strategies,
            diagnostics,
        })
    }
}

/// Reads both tables from CSV and runs a pipeline pass.
pub struct AttainmentImporter;

impl AttainmentImporter {
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        scores_path: P,
        matrix_path: Q,
        config: AnalysisConfig,
    ) -> Result<AttainmentReport, AttainmentImportError> {
        let scores = std::fs::File::open(scores_path)?;
        let matrix = std::fs::File::open(matrix_path)?;
        Self::from_readers(scores, matrix, config)
    }

    pub fn from_readers<S: Read, M: Read>(
        scores: S,
        matrix: M,
        config: AnalysisConfig,
    ) -> Result<AttainmentReport, AttainmentImportError> {
        let scores = parse_scores(scores)?;
        let matrix = parse_matrix(matrix)?;
        let report = AttainmentPipeline::new(config).run(&scores, &matrix)?;
        Ok(report)
    }
}
