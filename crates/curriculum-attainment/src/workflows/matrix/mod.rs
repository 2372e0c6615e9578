//! Read-only queries over a support matrix: which indicators a course
//! supports, which courses support an indicator, and how a course's support
//! changed between two matrix versions.

mod compare;
mod program;

pub use compare::{
    compare_versions, course_names, CourseComparison, IndicatorChange, SupportChange,
};
pub use program::{ProgramDefinition, ProgramError};

use crate::workflows::attainment::normalizer::normalize_name;
use crate::workflows::attainment::{IndicatorId, MatrixDataset, MatrixRow, Strength};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSupport {
    pub indicator: IndicatorId,
    pub strength: Strength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSupport {
    pub course_name: String,
    pub strength: Strength,
}

/// Indicators supported by a course, looked up by normalized name.
/// `None` when the matrix has no such course.
pub fn course_support(
    matrix: &MatrixDataset,
    course_name: &str,
    program: Option<&ProgramDefinition>,
) -> Option<Vec<IndicatorSupport>> {
    let row = matrix.find_course(&normalize_name(course_name))?;
    Some(
        row.support
            .iter()
            .map(|(indicator, strength)| IndicatorSupport {
                indicator: indicator.clone(),
                strength: *strength,
                description: program
                    .and_then(|program| program.description(indicator))
                    .map(str::to_string),
            })
            .collect(),
    )
}

/// Courses supporting an indicator, strongest first, then by name.
pub fn indicator_support(matrix: &MatrixDataset, indicator: &IndicatorId) -> Vec<CourseSupport> {
    let mut courses: Vec<CourseSupport> = matrix
        .rows
        .iter()
        .filter_map(|row| {
            row.strength_for(indicator).map(|strength| CourseSupport {
                course_name: row.raw_name.clone(),
                strength,
            })
        })
        .collect();
    courses.sort_by(|left, right| {
        left.strength
            .cmp(&right.strength)
            .then_with(|| left.course_name.cmp(&right.course_name))
    });
    courses
}

/// Orders matrix rows by course-name length, then by name.
pub fn reorder_by_name_length(rows: &mut [MatrixRow]) {
    rows.sort_by(|left, right| {
        let left_name = left.raw_name.trim();
        let right_name = right.raw_name.trim();
        left_name
            .chars()
            .count()
            .cmp(&right_name.chars().count())
            .then_with(|| left_name.cmp(right_name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::attainment::parse_matrix;
    use std::io::Cursor;

    fn matrix() -> MatrixDataset {
        let csv = "course_code,course_name,1-1,1-2,2-1\n\
1,大学物理实验（上）,L,H,\n\
2,光学,M,,H\n\
3,电磁学,H,,\n\
4,力学,M,,\n";
        parse_matrix(Cursor::new(csv)).expect("matrix parses")
    }

    fn indicator(raw: &str) -> IndicatorId {
        IndicatorId::parse(raw).expect("valid indicator")
    }

    #[test]
    fn course_support_uses_normalized_names() {
        let program = ProgramDefinition::from_yaml(
            "graduation_requirements:\n  - indicators:\n      - id: \"1-2\"\n        content: 实验能力\n",
        )
        .expect("program parses");
        let support = course_support(&matrix(), "大学物理实验(上)", Some(&program))
            .expect("course present");

        assert_eq!(support.len(), 2);
        assert_eq!(support[0].indicator, indicator("1-1"));
        assert_eq!(support[0].description, None);
        assert_eq!(support[1].strength, Strength::H);
        assert_eq!(support[1].description.as_deref(), Some("实验能力"));
        assert!(course_support(&matrix(), "热学", None).is_none());
    }

    #[test]
    fn indicator_support_orders_strongest_first() {
        let courses = indicator_support(&matrix(), &indicator("1-1"));
        let ordered: Vec<(&str, Strength)> = courses
            .iter()
            .map(|course| (course.course_name.as_str(), course.strength))
            .collect();
        assert_eq!(
            ordered,
            vec![
                ("电磁学", Strength::H),
                ("光学", Strength::M),
                ("力学", Strength::M),
                ("大学物理实验（上）", Strength::L),
            ]
        );
        assert!(indicator_support(&matrix(), &indicator("9-9")).is_empty());
    }

    #[test]
    fn reorders_rows_by_name_length() {
        let mut rows = matrix().rows;
        reorder_by_name_length(&mut rows);
        let names: Vec<&str> = rows.iter().map(|row| row.raw_name.as_str()).collect();
        assert_eq!(names, vec!["光学", "力学", "电磁学", "大学物理实验（上）"]);
    }
}
