use crate::export::write_report_tables;
use crate::infra::{init_cli_telemetry, resolve_analysis_config, PresetArg, WeightOverrides};
use clap::Args;
use curriculum_attainment::config::AnalysisConfig;
use curriculum_attainment::error::AppError;
use curriculum_attainment::workflows::attainment::{AttainmentImporter, AttainmentReport, Strength};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ReconcileArgs {
    /// Course attainment score table (CSV)
    #[arg(long)]
    pub(crate) scores: PathBuf,
    /// Course/indicator support matrix (CSV)
    #[arg(long)]
    pub(crate) matrix: PathBuf,
    /// Weight and threshold preset
    #[arg(long, value_enum, default_value_t = PresetArg::Batch)]
    pub(crate) preset: PresetArg,
    /// Override the weight of strongly supporting courses
    #[arg(long)]
    pub(crate) weight_h: Option<f64>,
    /// Override the weight of moderately supporting courses
    #[arg(long)]
    pub(crate) weight_m: Option<f64>,
    /// Override the weight of weakly supporting courses
    #[arg(long)]
    pub(crate) weight_l: Option<f64>,
    /// Override the attainment threshold
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Directory receiving the match log and aggregate tables as CSV
    #[arg(long)]
    pub(crate) out_dir: Option<PathBuf>,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_reconcile(args: ReconcileArgs) -> Result<(), AppError> {
    let ReconcileArgs {
        scores,
        matrix,
        preset,
        weight_h,
        weight_m,
        weight_l,
        threshold,
        out_dir,
        json,
    } = args;

    init_cli_telemetry()?;

    let base = AnalysisConfig::from_env(AnalysisConfig::from_preset(preset.into()))?;
    let overrides = WeightOverrides {
        high: weight_h,
        medium: weight_m,
        low: weight_l,
    };
    let config = resolve_analysis_config(base, overrides, threshold)?;
    let report = AttainmentImporter::from_paths(&scores, &matrix, config)?;

    if let Some(dir) = out_dir {
        let written = write_report_tables(&report, &dir)?;
        info!(dir = %dir.display(), files = written.len(), "wrote report tables");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        render_report(&mut out, &report)?;
    }
    Ok(())
}

pub(crate) fn render_report<W: Write>(out: &mut W, report: &AttainmentReport) -> io::Result<()> {
    let summary = report.summary();
    let weights = &report.weights;

    writeln!(out, "Attainment reconciliation")?;
    writeln!(
        out,
        "Weights: H={} M={} L={} (threshold {})",
        weights.high, weights.medium, weights.low, report.threshold
    )?;
    writeln!(
        out,
        "Matrix courses: {}, matched: {}, fact rows: {}",
        summary.matrix_courses, summary.matched_courses, summary.fact_rows
    )?;
    writeln!(
        out,
        "Strategies: code exact {}, code padded {}, name exact {}, fuzzy {}, not found {}",
        summary.strategies.code_exact,
        summary.strategies.code_padded,
        summary.strategies.name_exact,
        summary.strategies.fuzzy_name,
        summary.strategies.not_found
    )?;

    if !report.diagnostics.unmatched.is_empty() {
        writeln!(out, "\nUnmatched courses")?;
        for course in &report.diagnostics.unmatched {
            writeln!(out, "- {} {}", course.code, course.name)?;
        }
    }

    writeln!(out, "\nGraduation requirements")?;
    for result in &report.requirements {
        let views: Vec<String> = Strength::ordered()
            .into_iter()
            .map(|strength| match result.per_strength_score(strength) {
                Some(score) => format!("{strength} {score:.4}"),
                None => format!("{strength} -"),
            })
            .collect();
        let marker = if report.is_flagged(result.major_indicator) {
            "  below threshold"
        } else {
            ""
        };
        writeln!(
            out,
            "- {}: {:.4} ({}){}",
            result.major_indicator,
            result.composite_score,
            views.join(" / "),
            marker
        )?;
    }

    if report.flagged.is_empty() {
        writeln!(out, "\nAll requirements meet the threshold")?;
    } else {
        let flagged: Vec<String> = report.flagged.iter().map(ToString::to_string).collect();
        writeln!(out, "\nFlagged requirements: {}", flagged.join(", "))?;
    }

    if !report.weak_points.is_empty() {
        writeln!(out, "\nWeak indicator strengths")?;
        for stat in &report.weak_points {
            writeln!(
                out,
                "- {} {}: mean {:.4} over {} course(s)",
                stat.indicator, stat.strength, stat.mean, stat.course_count
            )?;
        }
    }

    let messages = report.diagnostics.messages();
    if !messages.is_empty() {
        writeln!(out, "\nData quality warnings ({})", messages.len())?;
        for message in messages {
            writeln!(out, "- {message}")?;
        }
    }

    Ok(())
}
