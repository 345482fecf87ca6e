//! Notification preference commands.

use std::collections::HashMap;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use sidechain_api::{Backends, build_state};
use sidechain_core::error::AppError;
use sidechain_core::types::NotificationPreferences;

/// Arguments for preference commands
#[derive(Debug, Args)]
pub struct PreferencesArgs {
    /// Preference subcommand
    #[command(subcommand)]
    pub command: PreferencesCommand,
}

/// Preference subcommands
#[derive(Debug, Subcommand)]
pub enum PreferencesCommand {
    /// Show effective preferences
    Show {
        /// User ID
        user_id: Uuid,
    },
    /// Change categories, e.g. `likes=false follows=true`
    Set {
        /// User ID
        user_id: Uuid,
        /// `category=bool` pairs
        #[arg(required = true, value_parser = parse_change)]
        changes: Vec<(String, bool)>,
    },
    /// Enable every category again
    Reset {
        /// User ID
        user_id: Uuid,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PreferenceRow {
    category: String,
    enabled: bool,
}

fn parse_change(raw: &str) -> Result<(String, bool), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected category=bool, got '{raw}'"))?;
    let enabled = value
        .parse::<bool>()
        .map_err(|_| format!("'{value}' is not true or false"))?;
    Ok((name.trim().to_string(), enabled))
}

fn rows(preferences: &NotificationPreferences) -> Vec<PreferenceRow> {
    preferences
        .0
        .iter()
        .map(|(category, enabled)| PreferenceRow {
            category: category.to_string(),
            enabled: *enabled,
        })
        .collect()
}

/// Execute preference commands
pub async fn execute(
    args: &PreferencesArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let backends = Backends::connect(&config).await?;
    let (state, _) = build_state(config, backends);

    let effective = match &args.command {
        PreferencesCommand::Show { user_id } => state.preferences.get(*user_id).await?,
        PreferencesCommand::Set { user_id, changes } => {
            let changes: HashMap<String, bool> = changes.iter().cloned().collect();
            let effective = state.preferences.update(*user_id, changes).await?;
            output::print_success(&format!("Preferences updated for {user_id}"));
            effective
        }
        PreferencesCommand::Reset { user_id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Re-enable every notification category for {user_id}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let effective = state.preferences.reset(*user_id).await?;
            output::print_success(&format!("Preferences reset for {user_id}"));
            effective
        }
    };

    output::print_list(&rows(&effective), format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change() {
        assert_eq!(
            parse_change("likes=false").unwrap(),
            ("likes".to_string(), false)
        );
        assert!(parse_change("likes").is_err());
        assert!(parse_change("likes=maybe").is_err());
    }

    #[test]
    fn test_rows_cover_every_category() {
        let effective = NotificationPreferences::default().effective();
        let rows = rows(&effective);
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|r| r.enabled));
    }
}
