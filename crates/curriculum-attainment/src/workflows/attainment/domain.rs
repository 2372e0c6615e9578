use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// How strongly a course supports a curriculum indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    H,
    M,
    L,
}

impl Strength {
    pub const fn ordered() -> [Self; 3] {
        [Self::H, Self::M, Self::L]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::M => "M",
            Self::L => "L",
        }
    }

    /// Parses a matrix cell. Blank cells are not strengths; callers decide
    /// how to report anything else that fails to parse.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "H" => Some(Self::H),
            "M" => Some(Self::M),
            "L" => Some(Self::L),
            _ => None,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn indicator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*[-_.]\s*(\d+)\s*$").expect("indicator pattern compiles")
    })
}

/// A decomposed indicator such as `1-1`. The leading digit run is the
/// major indicator (graduation requirement) it belongs to.
///
/// Separators `-`, `_` and `.` are accepted and rendered as `-`; leading
/// zeros are dropped so `01_1` and `1-1` name the same indicator. Ordering
/// is numeric on both parts, so `2-1` sorts before `10-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndicatorId {
    major: u64,
    minor: u64,
}

impl IndicatorId {
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = indicator_pattern().captures(raw)?;
        let major = captures.get(1)?.as_str().parse().ok()?;
        let minor = captures.get(2)?.as_str().parse().ok()?;
        Some(Self { major, minor })
    }

    pub fn major(&self) -> MajorIndicator {
        MajorIndicator(self.major)
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.major, self.minor)
    }
}

impl From<IndicatorId> for String {
    fn from(value: IndicatorId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for IndicatorId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("'{value}' is not an indicator id like 1-1"))
    }
}

/// Graduation requirement number shared by its decomposed indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String")]
pub struct MajorIndicator(u64);

impl MajorIndicator {
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    pub const fn number(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MajorIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MajorIndicator> for String {
    fn from(value: MajorIndicator) -> Self {
        value.to_string()
    }
}

/// One course from the achievement score dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseScoreRecord {
    pub raw_code: String,
    pub raw_name: String,
    pub attainment: Option<f64>,
}

/// One course from the support matrix with the indicators it supports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub raw_code: String,
    pub raw_name: String,
    pub support: BTreeMap<IndicatorId, Strength>,
}

impl MatrixRow {
    pub fn strength_for(&self, indicator: &IndicatorId) -> Option<Strength> {
        self.support.get(indicator).copied()
    }
}

/// Long-format row joining a matrix course, one indicator it supports and
/// the attainment score matched for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub course_name: String,
    pub indicator: IndicatorId,
    pub strength: Strength,
    pub attainment: f64,
}

/// Statistical weight given to each support strength when rolling course
/// scores up into a decomposed indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthWeights {
    #[serde(rename = "H")]
    pub high: f64,
    #[serde(rename = "M")]
    pub medium: f64,
    #[serde(rename = "L")]
    pub low: f64,
}

impl StrengthWeights {
    pub const fn new(high: f64, medium: f64, low: f64) -> Self {
        Self { high, medium, low }
    }

    /// Weights used by the batch statistical summary.
    pub const fn statistical() -> Self {
        Self::new(0.7, 0.25, 0.05)
    }

    /// Weights used by interactive computation.
    pub const fn interactive() -> Self {
        Self::new(1.0, 0.8, 0.6)
    }

    pub const fn weight(&self, strength: Strength) -> f64 {
        match strength {
            Strength::H => self.high,
            Strength::M => self.medium,
            Strength::L => self.low,
        }
    }

    /// Returns the first strength whose weight is not a positive finite number.
    pub fn invalid_strength(&self) -> Option<(Strength, f64)> {
        Strength::ordered()
            .into_iter()
            .map(|strength| (strength, self.weight(strength)))
            .find(|(_, weight)| !weight.is_finite() || *weight <= 0.0)
    }
}

impl Default for StrengthWeights {
    fn default() -> Self {
        Self::statistical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_parse_ignores_case_and_whitespace() {
        assert_eq!(Strength::parse(" h "), Some(Strength::H));
        assert_eq!(Strength::parse("m"), Some(Strength::M));
        assert_eq!(Strength::parse("L\t"), Some(Strength::L));
        assert_eq!(Strength::parse(""), None);
        assert_eq!(Strength::parse("X"), None);
    }

    #[test]
    fn indicator_id_derives_major_from_leading_digits() {
        let id = IndicatorId::parse("12-3").expect("valid id");
        assert_eq!(id.major(), MajorIndicator::new(12));
        assert_eq!(id.minor(), 3);
        assert_eq!(id.to_string(), "12-3");
    }

    #[test]
    fn indicator_id_canonicalises_separator_and_zeros() {
        assert_eq!(IndicatorId::parse("1_1"), IndicatorId::parse("1-1"));
        assert_eq!(IndicatorId::parse("01.1"), IndicatorId::parse("1-1"));
        assert!(IndicatorId::parse("1-").is_none());
        assert!(IndicatorId::parse("序号").is_none());
        assert!(IndicatorId::parse("1-1-1").is_none());
    }

    #[test]
    fn indicator_ids_sort_numerically() {
        let mut ids: Vec<IndicatorId> = ["10-1", "2-1", "1-10", "1-2"]
            .iter()
            .filter_map(|raw| IndicatorId::parse(raw))
            .collect();
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1-2", "1-10", "2-1", "10-1"]);
    }

    #[test]
    fn indicator_id_serializes_as_string() {
        let id = IndicatorId::parse("3-2").expect("valid id");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"3-2\"");
        let parsed: IndicatorId = serde_json::from_str("\"3_2\"").expect("deserialize");
        assert_eq!(parsed, id);
    }

    #[test]
    fn weights_report_non_positive_entries() {
        assert!(StrengthWeights::statistical().invalid_strength().is_none());
        let invalid = StrengthWeights::new(1.0, 0.0, 0.5).invalid_strength();
        assert_eq!(invalid, Some((Strength::M, 0.0)));
        assert!(StrengthWeights::new(f64::NAN, 1.0, 1.0)
            .invalid_strength()
            .is_some());
    }
}
