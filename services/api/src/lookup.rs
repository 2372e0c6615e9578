use crate::export::write_matrix;
use clap::Args;
use curriculum_attainment::error::AppError;
use curriculum_attainment::workflows::attainment::{
    parse_matrix, AttainmentImportError, IndicatorId, MatrixDataset, Strength,
};
use curriculum_attainment::workflows::matrix::{
    compare_versions, course_names, course_support, indicator_support, reorder_by_name_length,
    CourseComparison, CourseSupport, IndicatorSupport, ProgramDefinition,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct CourseArgs {
    /// Support matrix (CSV)
    #[arg(long)]
    pub(crate) matrix: PathBuf,
    /// Course name; matched after name normalization
    #[arg(long)]
    pub(crate) name: String,
    /// Program definition (YAML) supplying indicator descriptions
    #[arg(long)]
    pub(crate) program: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct IndicatorArgs {
    /// Support matrix (CSV)
    #[arg(long)]
    pub(crate) matrix: PathBuf,
    /// Decomposed indicator such as 1-1
    #[arg(long, value_parser = parse_indicator)]
    pub(crate) indicator: IndicatorId,
    /// Print JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Earlier matrix version (CSV)
    #[arg(long)]
    pub(crate) previous: PathBuf,
    /// Later matrix version (CSV)
    #[arg(long)]
    pub(crate) current: PathBuf,
    /// Restrict the comparison to one course; all changed courses otherwise
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReorderArgs {
    /// Support matrix (CSV)
    #[arg(long)]
    pub(crate) matrix: PathBuf,
    /// Destination CSV; stdout when omitted
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

pub(crate) fn parse_indicator(raw: &str) -> Result<IndicatorId, String> {
    IndicatorId::parse(raw).ok_or_else(|| format!("'{raw}' is not an indicator id like 1-1"))
}

fn load_matrix(path: &Path) -> Result<MatrixDataset, AppError> {
    let file = File::open(path)?;
    let matrix = parse_matrix(file).map_err(AttainmentImportError::from)?;
    Ok(matrix)
}

pub(crate) fn run_course(args: CourseArgs) -> Result<(), AppError> {
    let matrix = load_matrix(&args.matrix)?;
    let program = args
        .program
        .as_deref()
        .map(ProgramDefinition::from_path)
        .transpose()?;

    let support = course_support(&matrix, &args.name, program.as_ref());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &support)?;
        writeln!(out)?;
    } else {
        render_course(&mut out, &args.name, support.as_deref())?;
    }
    Ok(())
}

pub(crate) fn run_indicator(args: IndicatorArgs) -> Result<(), AppError> {
    let matrix = load_matrix(&args.matrix)?;
    let courses = indicator_support(&matrix, &args.indicator);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &courses)?;
        writeln!(out)?;
    } else {
        render_indicator(&mut out, &args.indicator, &courses)?;
    }
    Ok(())
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let previous = load_matrix(&args.previous)?;
    let current = load_matrix(&args.current)?;

    let comparisons: Vec<CourseComparison> = match &args.name {
        Some(name) => compare_versions(&previous, &current, name)
            .into_iter()
            .collect(),
        None => course_names(&previous, &current)
            .iter()
            .filter_map(|name| compare_versions(&previous, &current, name))
            .filter(|comparison| !comparison.is_unchanged())
            .collect(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &comparisons)?;
        writeln!(out)?;
    } else if comparisons.is_empty() {
        match &args.name {
            Some(name) => writeln!(out, "Course '{name}' is in neither matrix")?,
            None => writeln!(out, "No support changes between the two matrices")?,
        }
    } else {
        for comparison in &comparisons {
            render_comparison(&mut out, comparison)?;
        }
    }
    Ok(())
}

/// Rewrites a matrix with its rows ordered by course-name length.
pub(crate) fn run_reorder(args: ReorderArgs) -> Result<(), AppError> {
    let mut matrix = load_matrix(&args.matrix)?;
    reorder_by_name_length(&mut matrix.rows);

    match &args.out {
        Some(path) => {
            write_matrix(File::create(path)?, &matrix)?;
            info!(rows = matrix.rows.len(), path = %path.display(), "matrix reordered");
        }
        None => write_matrix(io::stdout().lock(), &matrix)?,
    }
    Ok(())
}

fn strength_label(strength: Option<Strength>) -> &'static str {
    strength.map_or("-", Strength::label)
}

pub(crate) fn render_course<W: Write>(
    out: &mut W,
    name: &str,
    support: Option<&[IndicatorSupport]>,
) -> io::Result<()> {
    let Some(support) = support else {
        return writeln!(out, "Course '{name}' not found in the matrix");
    };

    writeln!(out, "{name}: {} indicator(s)", support.len())?;
    for entry in support {
        match &entry.description {
            Some(description) => writeln!(
                out,
                "- {} [{}] {}",
                entry.indicator, entry.strength, description
            )?,
            None => writeln!(out, "- {} [{}]", entry.indicator, entry.strength)?,
        }
    }
    Ok(())
}

pub(crate) fn render_indicator<W: Write>(
    out: &mut W,
    indicator: &IndicatorId,
    courses: &[CourseSupport],
) -> io::Result<()> {
    writeln!(out, "Indicator {indicator}: {} course(s)", courses.len())?;
    for course in courses {
        writeln!(out, "- [{}] {}", course.strength, course.course_name)?;
    }
    Ok(())
}

pub(crate) fn render_comparison<W: Write>(
    out: &mut W,
    comparison: &CourseComparison,
) -> io::Result<()> {
    let presence = match (comparison.in_previous, comparison.in_current) {
        (true, true) => "",
        (true, false) => " (dropped)",
        (false, true) => " (new)",
        (false, false) => " (absent)",
    };
    writeln!(out, "{}{}", comparison.course_name, presence)?;
    for change in &comparison.changes {
        writeln!(
            out,
            "- {}: {} -> {} {}",
            change.indicator,
            strength_label(change.previous),
            strength_label(change.current),
            change.change.label()
        )?;
    }
    Ok(())
}
