//! Main entry point for the bikeshare dashboard.

use anyhow::Context;
use bikeshare_common::logging::{init_default_logging, init_logging};
use bikeshare_dash::{load_config, run, Cli, Dashboard};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let _guard = init_default_logging().context("Failed to initialize logging")?;
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _guard = init_logging(config.logging.to_logging_config()).context("Failed to initialize logging")?;
    info!(command = ?cli.command, "Starting bikeshare dashboard");

    let dashboard = Dashboard::new(config);
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = run(&cli, &dashboard, &mut stdout).await {
        error!("Command failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
