use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vitalsim::{runner, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries records
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    info!(
        producer = %cli.producer,
        output = ?settings.output,
        stream_name = %settings.stream_name,
        "Starting producer"
    );

    let summary = runner::run(cli.producer, &settings, shutdown_signal()).await?;

    info!(
        sent = summary.sent,
        reason = ?summary.reason,
        by_category = ?summary.by_category,
        "Done"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; run until limit or failure");
        std::future::pending::<()>().await;
    }
}
