use super::domain::{CourseScoreRecord, IndicatorId, MatrixRow, Strength};
use super::report::{InvalidAttainment, UnknownStrength};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

pub(crate) const COURSE_CODE: &str = "course_code";
pub(crate) const COURSE_NAME: &str = "course_name";
pub(crate) const ATTAINMENT: &str = "attainment";

/// Which input table a structural problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputTable {
    Scores,
    Matrix,
}

impl fmt::Display for InputTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scores => f.write_str("score dataset"),
            Self::Matrix => f.write_str("support matrix"),
        }
    }
}

/// Structural input problems. Any of these aborts the whole run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("{table} has no data rows")]
    EmptyTable { table: InputTable },
    #[error("{table} is missing required column '{column}'")]
    MissingColumn {
        table: InputTable,
        column: &'static str,
    },
    #[error("support matrix has no indicator columns (expected headers like 1-1)")]
    NoIndicatorColumns,
    #[error("support matrix lists indicator {indicator} in more than one column")]
    DuplicateIndicatorColumn { indicator: IndicatorId },
}

/// Parsed score dataset plus the cells that failed numeric coercion.
#[derive(Debug, Clone, Default)]
pub struct ScoreDataset {
    pub records: Vec<CourseScoreRecord>,
    pub invalid_attainment: Vec<InvalidAttainment>,
}

/// Parsed support matrix plus the cells that were not H/M/L.
#[derive(Debug, Clone, Default)]
pub struct MatrixDataset {
    pub indicators: Vec<IndicatorId>,
    pub rows: Vec<MatrixRow>,
    pub unknown_strengths: Vec<UnknownStrength>,
}

impl MatrixDataset {
    pub fn find_course(&self, normalized_name: &str) -> Option<&MatrixRow> {
        self.rows
            .iter()
            .find(|row| super::normalizer::normalize_name(&row.raw_name) == normalized_name)
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    course_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    course_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    attainment: Option<String>,
}

pub fn parse_scores<R: Read>(reader: R) -> Result<ScoreDataset, ParseError> {
    let mut csv_reader = reader_builder().from_reader(reader);
    let headers = canonical_headers(csv_reader.headers()?);
    for column in [COURSE_CODE, COURSE_NAME, ATTAINMENT] {
        require_column(&headers, InputTable::Scores, column)?;
    }
    csv_reader.set_headers(headers);

    let mut dataset = ScoreDataset::default();
    for row in csv_reader.deserialize::<ScoreRow>() {
        let row = row?;
        if row.course_code.is_none() && row.course_name.is_none() {
            continue;
        }

        let raw_code = row.course_code.unwrap_or_default();
        let raw_name = row.course_name.unwrap_or_default();
        let attainment = match row.attainment.as_deref().map(parse_attainment) {
            Some(Ok(value)) => value,
            Some(Err(())) => {
                dataset.invalid_attainment.push(InvalidAttainment {
                    code: raw_code.clone(),
                    name: raw_name.clone(),
                    raw_value: row.attainment.clone().unwrap_or_default(),
                });
                None
            }
            None => None,
        };

        dataset.records.push(CourseScoreRecord {
            raw_code,
            raw_name,
            attainment,
        });
    }

    if dataset.records.is_empty() {
        return Err(SchemaError::EmptyTable {
            table: InputTable::Scores,
        }
        .into());
    }
    Ok(dataset)
}

pub fn parse_matrix<R: Read>(reader: R) -> Result<MatrixDataset, ParseError> {
    let mut csv_reader = reader_builder().from_reader(reader);
    let headers = canonical_headers(csv_reader.headers()?);
    let code_column = require_column(&headers, InputTable::Matrix, COURSE_CODE)?;
    let name_column = require_column(&headers, InputTable::Matrix, COURSE_NAME)?;

    let mut indicator_columns: Vec<(usize, IndicatorId)> = Vec::new();
    for (position, header) in headers.iter().enumerate() {
        let Some(indicator) = IndicatorId::parse(header) else {
            continue;
        };
        if indicator_columns.iter().any(|(_, seen)| *seen == indicator) {
            return Err(SchemaError::DuplicateIndicatorColumn { indicator }.into());
        }
        indicator_columns.push((position, indicator));
    }
    if indicator_columns.is_empty() {
        return Err(SchemaError::NoIndicatorColumns.into());
    }

    let mut dataset = MatrixDataset {
        indicators: indicator_columns.iter().map(|(_, id)| id.clone()).collect(),
        ..MatrixDataset::default()
    };
    dataset.indicators.sort();

    for record in csv_reader.records() {
        let record = record?;
        let raw_code = record.get(code_column).unwrap_or_default().to_string();
        let raw_name = record.get(name_column).unwrap_or_default().to_string();
        if raw_code.is_empty() && raw_name.is_empty() {
            continue;
        }

        let mut support = BTreeMap::new();
        for (position, indicator) in &indicator_columns {
            let cell = record.get(*position).unwrap_or_default().trim();
            if cell.is_empty() {
                continue;
            }
            match Strength::parse(cell) {
                Some(strength) => {
                    support.insert(indicator.clone(), strength);
                }
                None => dataset.unknown_strengths.push(UnknownStrength {
                    course_name: raw_name.clone(),
                    indicator: indicator.clone(),
                    raw_value: cell.to_string(),
                }),
            }
        }

        dataset.rows.push(MatrixRow {
            raw_code,
            raw_name,
            support,
        });
    }

    if dataset.rows.is_empty() {
        return Err(SchemaError::EmptyTable {
            table: InputTable::Matrix,
        }
        .into());
    }
    Ok(dataset)
}

/// Errors from reading a CSV table.
#[derive(Debug)]
pub enum ParseError {
    Csv(csv::Error),
    Schema(SchemaError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ParseError::Schema(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Csv(err) => Some(err),
            ParseError::Schema(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<SchemaError> for ParseError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).flexible(true);
    builder
}

fn canonical_headers(raw: &csv::StringRecord) -> csv::StringRecord {
    raw.iter().map(canonical_header).collect()
}

fn canonical_header(raw: &str) -> String {
    let cleaned = raw.replace(['\u{feff}', '\u{200b}'], "");
    let cleaned = cleaned.trim();
    match cleaned.to_ascii_lowercase().as_str() {
        "course_code" | "code" | "课程代码" | "课程编码" => COURSE_CODE.to_string(),
        "course_name" | "name" | "课程名称" => COURSE_NAME.to_string(),
        "attainment" | "达成度" => ATTAINMENT.to_string(),
        _ => cleaned.to_string(),
    }
}

fn require_column(
    headers: &csv::StringRecord,
    table: InputTable,
    column: &'static str,
) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or(SchemaError::MissingColumn { table, column })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

// Ok(None) for spreadsheet NaN markers, Err for anything non-numeric.
fn parse_attainment(raw: &str) -> Result<Option<f64>, ()> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(()),
    }
}
