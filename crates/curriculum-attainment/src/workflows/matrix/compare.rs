use crate::workflows::attainment::normalizer::normalize_name;
use crate::workflows::attainment::{IndicatorId, MatrixDataset, Strength};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How one indicator's support changed between two matrix versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportChange {
    Unchanged,
    Removed,
    Added,
    Changed,
}

impl SupportChange {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unchanged => "Unchanged",
            Self::Removed => "Removed",
            Self::Added => "Added",
            Self::Changed => "Changed",
        }
    }

    fn between(previous: Option<Strength>, current: Option<Strength>) -> Option<Self> {
        match (previous, current) {
            (None, None) => None,
            (Some(_), None) => Some(Self::Removed),
            (None, Some(_)) => Some(Self::Added),
            (Some(old), Some(new)) if old == new => Some(Self::Unchanged),
            (Some(_), Some(_)) => Some(Self::Changed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorChange {
    pub indicator: IndicatorId,
    pub previous: Option<Strength>,
    pub current: Option<Strength>,
    pub change: SupportChange,
}

/// Support of one course in two matrix versions, indicator by indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseComparison {
    pub course_name: String,
    pub in_previous: bool,
    pub in_current: bool,
    pub changes: Vec<IndicatorChange>,
}

impl CourseComparison {
    pub fn is_unchanged(&self) -> bool {
        self.changes
            .iter()
            .all(|change| change.change == SupportChange::Unchanged)
    }
}

/// Compares a course across two matrix versions by normalized name.
/// Returns `None` when neither version lists the course.
pub fn compare_versions(
    previous: &MatrixDataset,
    current: &MatrixDataset,
    course_name: &str,
) -> Option<CourseComparison> {
    let key = normalize_name(course_name);
    let old_row = previous.find_course(&key);
    let new_row = current.find_course(&key);
    if old_row.is_none() && new_row.is_none() {
        return None;
    }

    let empty = BTreeMap::new();
    let old_support = old_row.map_or(&empty, |row| &row.support);
    let new_support = new_row.map_or(&empty, |row| &row.support);

    let indicators: BTreeSet<&IndicatorId> = old_support.keys().chain(new_support.keys()).collect();
    let changes = indicators
        .into_iter()
        .filter_map(|indicator| {
            let previous = old_support.get(indicator).copied();
            let current = new_support.get(indicator).copied();
            SupportChange::between(previous, current).map(|change| IndicatorChange {
                indicator: indicator.clone(),
                previous,
                current,
                change,
            })
        })
        .collect();

    let course_name = new_row
        .or(old_row)
        .map(|row| row.raw_name.clone())
        .unwrap_or_else(|| course_name.to_string());

    Some(CourseComparison {
        course_name,
        in_previous: old_row.is_some(),
        in_current: new_row.is_some(),
        changes,
    })
}

/// Sorted union of course names across both versions.
pub fn course_names(previous: &MatrixDataset, current: &MatrixDataset) -> Vec<String> {
    previous
        .rows
        .iter()
        .chain(current.rows.iter())
        .map(|row| row.raw_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::attainment::parse_matrix;
    use std::io::Cursor;

    fn matrices() -> (MatrixDataset, MatrixDataset) {
        let previous = "course_code,course_name,1-1,1-2,2-1,3-1\n\
1,科学教育概论,H,M,L,\n\
2,普通物理,M,,,\n";
        let current = "course_code,course_name,1-1,1-2,2-1,3-1\n\
1,科学教育概论,H,L,,M\n\
3,人工智能导论,,,H,\n";
        (
            parse_matrix(Cursor::new(previous)).expect("previous matrix"),
            parse_matrix(Cursor::new(current)).expect("current matrix"),
        )
    }

    #[test]
    fn classifies_each_indicator_change() {
        let (previous, current) = matrices();
        let comparison = compare_versions(&previous, &current, "科学教育概论").expect("present");

        let changes: Vec<(String, SupportChange)> = comparison
            .changes
            .iter()
            .map(|change| (change.indicator.to_string(), change.change))
            .collect();
        assert_eq!(
            changes,
            vec![
                ("1-1".to_string(), SupportChange::Unchanged),
                ("1-2".to_string(), SupportChange::Changed),
                ("2-1".to_string(), SupportChange::Removed),
                ("3-1".to_string(), SupportChange::Added),
            ]
        );
        assert!(!comparison.is_unchanged());
    }

    #[test]
    fn course_missing_from_one_version() {
        let (previous, current) = matrices();
        let comparison = compare_versions(&previous, &current, "普通物理").expect("present");
        assert!(comparison.in_previous);
        assert!(!comparison.in_current);
        assert!(comparison
            .changes
            .iter()
            .all(|change| change.change == SupportChange::Removed));

        assert!(compare_versions(&previous, &current, "不存在的课程").is_none());
    }

    #[test]
    fn lists_union_of_course_names() {
        let (previous, current) = matrices();
        let names = course_names(&previous, &current);
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"人工智能导论".to_string()));
    }
}
