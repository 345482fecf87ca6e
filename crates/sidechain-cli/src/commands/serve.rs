//! Start the Sidechain server.

use clap::Args;

use sidechain_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip background tasks (presence sweep, search reconciliation)
    #[arg(long)]
    pub no_workers: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_workers {
        config.worker.enabled = false;
    }

    println!("Starting Sidechain server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    sidechain_api::init_logging(&config.logging);
    sidechain_api::run_server(config).await
}
