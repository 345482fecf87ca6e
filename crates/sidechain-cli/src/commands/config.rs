//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output;
use sidechain_core::error::AppError;
use sidechain_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, config_path: &str) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = super::load_config(config_path)?;
            config.database.url = mask_password(&config.database.url);
            if !config.auth.jwt_secret.is_empty() {
                config.auth.jwt_secret = "****".to_string();
            }
            output::print_json(&config);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                output::print_kv(
                    "Server",
                    &format!("{}:{}", config.server.host, config.server.port),
                );
                let database = if config.database.url.is_empty() {
                    "in-memory".to_string()
                } else {
                    mask_password(&config.database.url)
                };
                output::print_kv("Database", &database);
                output::print_kv("Cache", &config.cache.provider);
                output::print_kv("Feed", &config.feed.provider);
                output::print_kv("Search", &config.search.provider);
                if config.auth.jwt_secret.is_empty() {
                    output::print_warning("auth.jwt_secret is empty; every token will be rejected");
                }
                if config.server.internal_token.is_empty() {
                    output::print_warning("server.internal_token is empty; /api/v1/events is open");
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
