mod cli;
mod export;
mod infra;
mod lookup;
mod reconcile;
mod routes;
mod server;

use curriculum_attainment::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
