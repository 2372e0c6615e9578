use curriculum_attainment::error::AppError;
use curriculum_attainment::workflows::attainment::{AttainmentReport, MatrixDataset};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) const MATCH_LOG_FILE: &str = "match_log.csv";
pub(crate) const FACTS_FILE: &str = "facts.csv";
pub(crate) const INDICATOR_STATS_FILE: &str = "indicator_stats.csv";
pub(crate) const INDICATOR_SCORES_FILE: &str = "indicator_scores.csv";
pub(crate) const REQUIREMENTS_FILE: &str = "requirements.csv";

/// Writes every report table into `dir`, creating it when missing.
/// Returns the written paths in a stable order.
pub(crate) fn write_report_tables(
    report: &AttainmentReport,
    dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)?;

    Ok(vec![
        write_table(dir, MATCH_LOG_FILE, &report.match_log)?,
        write_table(dir, FACTS_FILE, &report.facts)?,
        write_table(dir, INDICATOR_STATS_FILE, &report.strength_stats)?,
        write_table(dir, INDICATOR_SCORES_FILE, &report.indicators)?,
        write_table(dir, REQUIREMENTS_FILE, &report.requirements)?,
    ])
}

fn write_table<T: Serialize>(dir: &Path, file_name: &str, rows: &[T]) -> Result<PathBuf, AppError> {
    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

/// Writes a support matrix back out in its input layout: code, name, then
/// one column per indicator with the strength label or a blank cell.
pub(crate) fn write_matrix<W: Write>(writer: W, matrix: &MatrixDataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["course_code".to_string(), "course_name".to_string()];
    header.extend(matrix.indicators.iter().map(ToString::to_string));
    writer.write_record(&header)?;

    for row in &matrix.rows {
        let mut record = vec![row.raw_code.clone(), row.raw_name.clone()];
        record.extend(matrix.indicators.iter().map(|indicator| {
            row.strength_for(indicator)
                .map_or_else(String::new, |strength| strength.label().to_string())
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum_attainment::config::AnalysisConfig;
    use curriculum_attainment::workflows::attainment::{parse_matrix, AttainmentImporter};
    use curriculum_attainment::workflows::matrix::reorder_by_name_length;

    fn sample_report() -> AttainmentReport {
        let scores = "course_code,course_name,attainment\n1,光学,0.9\n2,热学,0.6\n";
        let matrix = "course_code,course_name,1-1,2-1\n1,光学,H,M\n2,热学,L,\n3,力学,H,\n";
        AttainmentImporter::from_readers(
            scores.as_bytes(),
            matrix.as_bytes(),
            AnalysisConfig::batch(),
        )
        .expect("import succeeds")
    }

    #[test]
    fn writes_all_tables_with_headers() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = temp.path().join("report");
        let written = write_report_tables(&sample_report(), &dir).expect("tables written");

        let names: Vec<String> = written
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                MATCH_LOG_FILE,
                FACTS_FILE,
                INDICATOR_STATS_FILE,
                INDICATOR_SCORES_FILE,
                REQUIREMENTS_FILE
            ]
        );

        let match_log = fs::read_to_string(dir.join(MATCH_LOG_FILE)).expect("match log");
        let mut lines = match_log.lines();
        assert_eq!(
            lines.next(),
            Some("matrix_code,matrix_name,match_strategy,matched_code,matched_name,attainment")
        );
        assert_eq!(lines.nth(2), Some("3,力学,Not Found,,,"));

        let facts = fs::read_to_string(dir.join(FACTS_FILE)).expect("facts");
        assert_eq!(
            facts.lines().collect::<Vec<_>>(),
            vec![
                "course_name,indicator,strength,attainment",
                "光学,1-1,H,0.9",
                "热学,1-1,L,0.6",
                "光学,2-1,M,0.9",
            ]
        );

        let requirements = fs::read_to_string(dir.join(REQUIREMENTS_FILE)).expect("requirements");
        assert_eq!(
            requirements.lines().next(),
            Some("major_indicator,composite_score,H_score,M_score,L_score")
        );
    }

    #[test]
    fn reordered_matrix_keeps_its_columns() {
        let csv = "课程编码,课程名称,2-1,1-1\n7,大学物理实验,H,\n8,光学,,M\n9,热学,L,H\n";
        let mut matrix = parse_matrix(csv.as_bytes()).expect("matrix parses");
        reorder_by_name_length(&mut matrix.rows);

        let mut buffer = Vec::new();
        write_matrix(&mut buffer, &matrix).expect("matrix written");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "course_code,course_name,1-1,2-1",
                "8,光学,M,",
                "9,热学,H,L",
                "7,大学物理实验,,H",
            ]
        );

        let reparsed = parse_matrix(text.as_bytes()).expect("written matrix parses");
        assert_eq!(reparsed.rows.len(), 3);
        assert_eq!(reparsed.indicators, matrix.indicators);
    }
}
