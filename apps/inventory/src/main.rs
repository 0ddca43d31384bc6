//! # Inventory Entry Point
//!
//! Parses arguments, loads configuration, opens the store and runs one
//! command. The setup lives in the library for testability.
//!
//! ## Exit Status
//! - `0` - command succeeded
//! - `1` - command failed; the error goes to stderr, as an
//!   [`ErrorReport`](inventory_app::ErrorReport) JSON object with `--json`

use std::process::ExitCode;

use clap::Parser;
use inventory_app::config::DEFAULT_LOG_FILTER;
use inventory_app::{cli, init_tracing, AppConfig, AppContainer, AppResult, Cli};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            if json {
                match serde_json::to_string(&e.report()) {
                    Ok(report) => eprintln!("{}", report),
                    Err(_) => eprintln!("error: {}", e),
                }
            } else {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let logging = init_tracing(DEFAULT_LOG_FILTER);

    let mut config = AppConfig::load(cli.config)?;
    if let Some(path) = cli.db {
        config.database_path = Some(path);
    }
    if let Some(logging) = &logging {
        logging.set_filter(&config.log_filter);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting inventory");

    let container = AppContainer::new(config).await?;
    let mut stdout = std::io::stdout();
    let result = cli::run(cli.command, cli.json, &container, &mut stdout).await;
    container.shutdown().await;

    result
}
