use export_telemetry::tracing::init_tracing;

use crate::core::start_export_job;

mod config;
mod core;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_name = env!("CARGO_BIN_NAME");

    // The flusher must stay alive for the duration of the process so buffered
    // log lines are written out on exit.
    let _log_flusher = init_tracing(app_name)?;

    start_export_job().await?;

    Ok(())
}
