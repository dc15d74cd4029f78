//! Main entry point for the gridstatus CLI

use clap::Parser;
use gridstatus_client::cli::{Cli, Commands};
use gridstatus_client::CancelToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gridstatus=info,gridstatus_client=info"));

    // Logs go to stderr so query output on stdout stays clean CSV.
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(cli: &Cli, cancel: CancelToken) -> anyhow::Result<()> {
    let client = cli.build_client(cancel)?;

    match &cli.command {
        Commands::Query(args) => args.execute(&client).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Datasets(args) => args.execute(&client).await,
        Commands::DailyPeak(args) => args.execute(&client).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let cancel = CancelToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - cancelling");
                cancel.cancel();
            }
        }
    });

    if let Err(e) = run(&cli, cancel).await {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
