//! Sidechain server: realtime presence and notification fan-out.
//!
//! Main entry point that loads configuration, installs logging and starts
//! the server.

use sidechain_core::config::AppConfig;
use sidechain_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    sidechain_api::init_logging(&config.logging);

    if let Err(e) = sidechain_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `SIDECHAIN_ENV` overlay and
/// `SIDECHAIN__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SIDECHAIN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}
