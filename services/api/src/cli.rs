use crate::lookup::{
    run_compare, run_course, run_indicator, run_reorder, CompareArgs, CourseArgs, IndicatorArgs,
    ReorderArgs,
};
use crate::reconcile::{run_reconcile, ReconcileArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use curriculum_attainment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Curriculum Attainment",
    about = "Reconcile course attainment scores with a curriculum support matrix and report graduation-requirement attainment",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Match a score table against a support matrix and aggregate attainment
    Reconcile(ReconcileArgs),
    /// List the indicators a course supports
    Course(CourseArgs),
    /// List the courses supporting an indicator
    Indicator(IndicatorArgs),
    /// Compare a course's support between two matrix versions
    Compare(CompareArgs),
    /// Rewrite a support matrix with rows ordered by course-name length
    Reorder(ReorderArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Reconcile(args) => run_reconcile(args),
        Command::Course(args) => run_course(args),
        Command::Indicator(args) => run_indicator(args),
        Command::Compare(args) => run_compare(args),
        Command::Reorder(args) => run_reorder(args),
    }
}
