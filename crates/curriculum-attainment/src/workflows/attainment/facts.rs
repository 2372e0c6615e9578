use super::domain::FactRow;
use super::matcher::MatchResult;
use super::report::ExcludedCourse;

/// Long-format fact table built from matched matrix rows.
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    pub rows: Vec<FactRow>,
    /// Matched courses whose score record has no usable attainment value.
    pub excluded: Vec<ExcludedCourse>,
}

/// Melts each matched matrix row into one fact per supported indicator.
///
/// Unmatched rows and rows whose matched record lacks an attainment value
/// contribute nothing. The course name comes from the matrix.
pub fn build_facts(matches: &[MatchResult<'_>]) -> FactTable {
    let mut table = FactTable::default();

    for result in matches {
        let Some(record) = result.record else {
            continue;
        };
        let row = result.matrix_row;

        let Some(attainment) = record.attainment else {
            if !row.support.is_empty() {
                table.excluded.push(ExcludedCourse {
                    matrix_name: row.raw_name.clone(),
                    matched_code: record.raw_code.clone(),
                    matched_name: record.raw_name.clone(),
                });
            }
            continue;
        };

        table
            .rows
            .extend(row.support.iter().map(|(indicator, strength)| FactRow {
                course_name: row.raw_name.clone(),
                indicator: indicator.clone(),
                strength: *strength,
                attainment,
            }));
    }

    table.rows.sort_by(|left, right| {
        left.indicator
            .cmp(&right.indicator)
            .then_with(|| left.course_name.cmp(&right.course_name))
    });
    table
}
