//! Access token issuance for local testing.

use clap::{Args, Subcommand};
use uuid::Uuid;

use sidechain_auth::JwtEncoder;
use sidechain_core::error::AppError;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Sign an access token with the configured secret
    Issue {
        /// User ID; a random one when omitted
        #[arg(long)]
        user_id: Option<Uuid>,
        /// Username claim
        username: String,
    },
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.auth.jwt_secret.is_empty() {
        return Err(AppError::configuration("auth.jwt_secret is not set"));
    }
    let encoder = JwtEncoder::new(&config.auth);

    match &args.command {
        TokenCommand::Issue { user_id, username } => {
            let user_id = user_id.unwrap_or_else(Uuid::new_v4);
            let token = encoder.generate_access_token(user_id, username)?;
            eprintln!("user_id: {user_id}");
            println!("{token}");
        }
    }
    Ok(())
}
