//! Main entry point for the Spazio API

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use spazio_api::{config::Config, server::Server, Result};
use spazio_common::ConfigLoader;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "spazio-api", about = "Spazio marketplace API", version, author)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate example configuration file
    #[arg(long)]
    gen_config: bool,

    /// Load the configuration and exit without serving
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!("{}=info", env!("CARGO_BIN_NAME").replace("-", "_"));
    spazio_common::logging::init_logging(&args.verbosity, &log_filter).map_err(|e| {
        spazio_api::ApiError::Internal {
            message: format!("Failed to initialize logging: {e}"),
        }
    })?;

    info!("Starting Spazio API v{}", spazio_api::VERSION);

    if args.gen_config {
        let example_config = Config::generate_example()?;
        println!("{example_config}");
        return Ok(());
    }

    let config = Config::load(args.config)?;
    info!(
        "Configuration loaded, binding to {}",
        config.server.bind_address
    );

    if args.dry_run {
        info!("Dry run requested, configuration is valid");
        return Ok(());
    }

    let server = Server::new(config).await?;

    info!("Spazio API initialized successfully");

    match server.run().await {
        Ok(()) => {
            info!("Spazio API shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Spazio API error: {}", e);
            Err(e)
        }
    }
}
