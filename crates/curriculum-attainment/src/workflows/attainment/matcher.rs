use super::domain::{CourseScoreRecord, MatrixRow};
use super::normalizer::{normalize_code, normalize_name};
use super::report::{DuplicateIdentifier, IdentifierKind};
use super::similarity::similarity_ratio;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.70;
pub const DEFAULT_PAD_WIDTH: usize = 8;

/// Which lookup resolved a matrix row, in the order they are attempted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchStrategy {
    CodeExact,
    CodePadded,
    NameExact,
    FuzzyName { candidate: String, ratio: f64 },
    NotFound,
}

impl MatchStrategy {
    pub fn label(&self) -> String {
        match self {
            Self::CodeExact => "Code Exact".to_string(),
            Self::CodePadded => "Code Padded".to_string(),
            Self::NameExact => "Name Exact".to_string(),
            Self::FuzzyName { candidate, .. } => format!("Fuzzy ({candidate})"),
            Self::NotFound => "Not Found".to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// Outcome of resolving one matrix row against the score dataset.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub matrix_row: &'a MatrixRow,
    pub record: Option<&'a CourseScoreRecord>,
    pub strategy: MatchStrategy,
}

/// Tuning for the strategy chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub fuzzy_cutoff: f64,
    pub pad_width: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            pad_width: DEFAULT_PAD_WIDTH,
        }
    }
}

/// Lookup tables over the score dataset. The first record seen for a key
/// wins; later ones are kept in `duplicates` for the diagnostics report.
pub struct CourseIndex<'a> {
    records: &'a [CourseScoreRecord],
    by_code: HashMap<String, usize>,
    by_padded_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    names: Vec<String>,
    duplicates: Vec<DuplicateIdentifier>,
    options: MatchOptions,
}

impl<'a> CourseIndex<'a> {
    pub fn build(records: &'a [CourseScoreRecord], options: MatchOptions) -> Self {
        let mut index = Self {
            records,
            by_code: HashMap::with_capacity(records.len()),
            by_padded_code: HashMap::with_capacity(records.len()),
            by_name: HashMap::with_capacity(records.len()),
            names: Vec::with_capacity(records.len()),
            duplicates: Vec::new(),
            options,
        };

        for (position, record) in records.iter().enumerate() {
            let code = normalize_code(&record.raw_code);
            if !code.is_empty() {
                index.insert_code(code.clone(), position);
                let padded = pad_code(&code, options.pad_width);
                index.by_padded_code.entry(padded).or_insert(position);
            }

            let name = normalize_name(&record.raw_name);
            if !name.is_empty() {
                index.insert_name(name, position);
            }
        }

        index
    }

    fn insert_code(&mut self, key: String, position: usize) {
        if let Some(&kept) = self.by_code.get(&key) {
            self.record_duplicate(IdentifierKind::Code, key, kept, position);
        } else {
            self.by_code.insert(key, position);
        }
    }

    fn insert_name(&mut self, key: String, position: usize) {
        if let Some(&kept) = self.by_name.get(&key) {
            self.record_duplicate(IdentifierKind::Name, key, kept, position);
        } else {
            self.names.push(key.clone());
            self.by_name.insert(key, position);
        }
    }

    fn record_duplicate(&mut self, kind: IdentifierKind, key: String, kept: usize, dropped: usize) {
        let kept = &self.records[kept];
        let dropped = &self.records[dropped];
        warn!(
            kind = kind.label(),
            %key,
            kept = %kept.raw_name,
            dropped = %dropped.raw_name,
            "duplicate course identifier in score dataset; keeping first occurrence"
        );
        self.duplicates.push(DuplicateIdentifier {
            kind,
            key,
            kept_code: kept.raw_code.clone(),
            kept_name: kept.raw_name.clone(),
            dropped_code: dropped.raw_code.clone(),
            dropped_name: dropped.raw_name.clone(),
        });
    }

    pub fn duplicates(&self) -> &[DuplicateIdentifier] {
        &self.duplicates
    }

    /// Runs the strategy chain for one matrix row, stopping at the first hit.
    pub fn resolve(&self, row: &'a MatrixRow) -> MatchResult<'a> {
        let records: &'a [CourseScoreRecord] = self.records;
        let (record, strategy) = match self.lookup(row) {
            Some((position, strategy)) => (Some(&records[position]), strategy),
            None => (None, MatchStrategy::NotFound),
        };

        MatchResult {
            matrix_row: row,
            record,
            strategy,
        }
    }

    fn lookup(&self, row: &MatrixRow) -> Option<(usize, MatchStrategy)> {
        let code = normalize_code(&row.raw_code);
        if !code.is_empty() {
            if let Some(&position) = self.by_code.get(&code) {
                return Some((position, MatchStrategy::CodeExact));
            }
            let padded = pad_code(&code, self.options.pad_width);
            if let Some(&position) = self.by_padded_code.get(&padded) {
                return Some((position, MatchStrategy::CodePadded));
            }
        }

        let name = normalize_name(&row.raw_name);
        if name.is_empty() {
            return None;
        }
        if let Some(&position) = self.by_name.get(&name) {
            return Some((position, MatchStrategy::NameExact));
        }

        let (candidate, ratio) = self.closest_name(&name)?;
        debug!(matrix_name = %row.raw_name, %candidate, ratio, "fuzzy course name match");
        let position = *self.by_name.get(candidate)?;
        Some((
            position,
            MatchStrategy::FuzzyName {
                candidate: candidate.to_string(),
                ratio,
            },
        ))
    }

    // Single best candidate at or above the cutoff; ties keep the candidate
    // seen first in the score dataset.
    fn closest_name(&self, name: &str) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for candidate in &self.names {
            let ratio = similarity_ratio(name, candidate);
            if ratio < self.options.fuzzy_cutoff {
                continue;
            }
            if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                best = Some((candidate.as_str(), ratio));
            }
        }
        best
    }
}

/// Left-pads a normalized code with zeros to `width` characters.
pub fn pad_code(code: &str, width: usize) -> String {
    let len = code.chars().count();
    if len >= width {
        return code.to_string();
    }
    let mut padded = "0".repeat(width - len);
    padded.push_str(code);
    padded
}

/// Resolves every matrix row, in order, against the score dataset.
pub fn match_courses<'a>(
    matrix_rows: &'a [MatrixRow],
    score_records: &'a [CourseScoreRecord],
    options: MatchOptions,
) -> (Vec<MatchResult<'a>>, Vec<DuplicateIdentifier>) {
    let index = CourseIndex::build(score_records, options);
    let results = matrix_rows.iter().map(|row| index.resolve(row)).collect();
    (results, index.duplicates)
}
