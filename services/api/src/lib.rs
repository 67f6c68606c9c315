mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use newsroom_workload::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
