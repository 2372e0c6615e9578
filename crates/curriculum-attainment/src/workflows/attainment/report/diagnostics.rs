use super::super::domain::IndicatorId;
use serde::Serialize;

/// Which normalized key two score records collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Code,
    Name,
}

impl IdentifierKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Name => "name",
        }
    }
}

/// A score record shadowed by an earlier record with the same normalized key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateIdentifier {
    pub kind: IdentifierKind,
    pub key: String,
    pub kept_code: String,
    pub kept_name: String,
    pub dropped_code: String,
    pub dropped_name: String,
}

/// Matrix course that no strategy could resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedCourse {
    pub code: String,
    pub name: String,
}

/// Score cell that could not be read as a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidAttainment {
    pub code: String,
    pub name: String,
    pub raw_value: String,
}

/// Matched course dropped from the fact table for lack of an attainment value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedCourse {
    pub matrix_name: String,
    pub matched_code: String,
    pub matched_name: String,
}

/// Matrix cell that is neither blank nor one of H/M/L.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownStrength {
    pub course_name: String,
    pub indicator: IndicatorId,
    pub raw_value: String,
}

/// Data-quality findings that did not stop the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched: Vec<UnmatchedCourse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DuplicateIdentifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_attainment: Vec<InvalidAttainment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedCourse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_strengths: Vec<UnknownStrength>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degenerate_indicators: Vec<IndicatorId>,
}

impl Diagnostics {
    pub fn warning_count(&self) -> usize {
        self.unmatched.len()
            + self.duplicates.len()
            + self.invalid_attainment.len()
            + self.excluded.len()
            + self.unknown_strengths.len()
            + self.degenerate_indicators.len()
    }

    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }

    /// Human-readable one-liners, one per finding.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::with_capacity(self.warning_count());
        messages.extend(self.unmatched.iter().map(|course| {
            format!(
                "no attainment score found for matrix course '{}' ({})",
                course.name, course.code
            )
        }));
        messages.extend(self.duplicates.iter().map(|dup| {
            format!(
                "duplicate {} '{}': kept '{}' ({}), dropped '{}' ({})",
                dup.kind.label(),
                dup.key,
                dup.kept_name,
                dup.kept_code,
                dup.dropped_name,
                dup.dropped_code
            )
        }));
        messages.extend(self.invalid_attainment.iter().map(|invalid| {
            format!(
                "attainment '{}' for '{}' ({}) is not a number",
                invalid.raw_value, invalid.name, invalid.code
            )
        }));
        messages.extend(self.excluded.iter().map(|excluded| {
            format!(
                "matrix course '{}' matched '{}' ({}) which has no attainment value",
                excluded.matrix_name, excluded.matched_name, excluded.matched_code
            )
        }));
        messages.extend(self.unknown_strengths.iter().map(|unknown| {
            format!(
                "support strength '{}' for '{}' on {} is not H/M/L",
                unknown.raw_value, unknown.course_name, unknown.indicator
            )
        }));
        messages.extend(self.degenerate_indicators.iter().map(|indicator| {
            format!("indicator {indicator} has zero total weight and scores 0")
        }));
        messages
    }
}
