mod commands;
mod startup;

use clap::Parser;
use commands::Cli;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = Cli::parse();
    info!("Starting shiftsync");

    // Load configuration
    let config = startup::load_config()?;

    let summary = commands::run(cli, config).await?;
    println!(
        "{} created, {} skipped, {} failed",
        summary.created, summary.skipped, summary.failed
    );

    Ok(())
}
