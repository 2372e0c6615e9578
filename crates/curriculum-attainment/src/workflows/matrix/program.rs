use crate::workflows::attainment::IndicatorId;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("failed to read program definition: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid program definition YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize)]
struct ProgramFile {
    #[serde(default)]
    graduation_requirements: Vec<RequirementEntry>,
}

#[derive(Debug, Deserialize)]
struct RequirementEntry {
    #[serde(default)]
    indicators: Vec<IndicatorEntry>,
}

#[derive(Debug, Deserialize)]
struct IndicatorEntry {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    content: String,
}

/// Indicator descriptions from a curriculum program definition.
///
/// Only `graduation_requirements[].indicators[].{id, content}` is read;
/// ids may be written as strings (`"1-1"`) or numbers (`1.1`). Entries
/// whose id is not an indicator id are skipped.
#[derive(Debug, Clone, Default)]
pub struct ProgramDefinition {
    descriptions: BTreeMap<IndicatorId, String>,
}

impl ProgramDefinition {
    pub fn from_yaml(source: &str) -> Result<Self, ProgramError> {
        let file: ProgramFile = serde_yaml::from_str(source)?;
        let descriptions = file
            .graduation_requirements
            .into_iter()
            .flat_map(|requirement| requirement.indicators)
            .filter_map(|entry| {
                let id = match &entry.id {
                    Value::String(raw) => IndicatorId::parse(raw),
                    Value::Number(raw) => IndicatorId::parse(&raw.to_string()),
                    _ => None,
                }?;
                Some((id, entry.content.trim().to_string()))
            })
            .collect();

        Ok(Self { descriptions })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProgramError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    pub fn description(&self, indicator: &IndicatorId) -> Option<&str> {
        self.descriptions.get(indicator).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = r#"
program: 科学教育
graduation_requirements:
  - id: 1
    name: 师德规范
    indicators:
      - id: "1-1"
        content: 理解并践行社会主义核心价值观
      - id: 1.2
        content: "  具有依法执教意识  "
  - id: 2
    indicators:
      - id: 总体
        content: 不是指标点
"#;

    fn indicator(raw: &str) -> IndicatorId {
        IndicatorId::parse(raw).expect("valid indicator")
    }

    #[test]
    fn reads_string_and_numeric_ids() {
        let program = ProgramDefinition::from_yaml(PROGRAM).expect("valid yaml");
        assert_eq!(program.len(), 2);
        assert_eq!(
            program.description(&indicator("1-1")),
            Some("理解并践行社会主义核心价值观")
        );
        assert_eq!(program.description(&indicator("1-2")), Some("具有依法执教意识"));
        assert!(program.description(&indicator("2-1")).is_none());
    }

    #[test]
    fn missing_requirements_yield_empty_definition() {
        let program = ProgramDefinition::from_yaml("program: empty\n").expect("valid yaml");
        assert!(program.is_empty());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let error = ProgramDefinition::from_yaml("graduation_requirements: [").expect_err("bad yaml");
        assert!(matches!(error, ProgramError::Yaml(_)));
    }
}
