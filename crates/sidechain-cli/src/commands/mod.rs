//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod preferences;
pub mod reconcile;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use sidechain_core::config::AppConfig;
use sidechain_core::error::AppError;

/// Sidechain: realtime presence and notification fan-out
#[derive(Debug, Parser)]
#[command(name = "sidechain", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Sidechain server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Run one search reconciliation pass
    Reconcile(reconcile::ReconcileArgs),
    /// Inspect or change a user's notification preferences
    Preferences(preferences::PreferencesArgs),
    /// Issue access tokens for local testing
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config).await,
            Commands::Reconcile(args) => reconcile::execute(args, &self.config, self.format).await,
            Commands::Preferences(args) => {
                preferences::execute(args, &self.config, self.format).await
            }
            Commands::Token(args) => token::execute(args, &self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let path = config_path.trim_end_matches(".toml");
    AppConfig::load_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_preference_set() {
        let cli = Cli::try_parse_from([
            "sidechain",
            "preferences",
            "set",
            "7f0c3a4e-8d5b-4f6a-9c1e-2b3d4e5f6a7b",
            "likes=false",
            "follows=true",
        ])
        .unwrap();
        match cli.command {
            Commands::Preferences(args) => match args.command {
                preferences::PreferencesCommand::Set { changes, .. } => {
                    assert_eq!(changes.len(), 2)
                }
                other => panic!("unexpected command {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }
}
