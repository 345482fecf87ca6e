//! Manual search reconciliation.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use sidechain_api::{Backends, build_state};
use sidechain_core::error::AppError;

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Override the per-run post sample size
    #[arg(long)]
    pub posts: Option<u32>,

    /// Override the per-run user sample size
    #[arg(long)]
    pub users: Option<u32>,

    /// Override the per-run story sample size
    #[arg(long)]
    pub stories: Option<u32>,
}

#[derive(Debug, Serialize, Tabled)]
struct KindRow {
    kind: &'static str,
    upserted: u32,
    status: &'static str,
}

/// Execute one reconciliation pass and print what it repaired
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;
    if let Some(posts) = args.posts {
        config.reconciliation.post_sample = posts;
    }
    if let Some(users) = args.users {
        config.reconciliation.user_sample = users;
    }
    if let Some(stories) = args.stories {
        config.reconciliation.story_sample = stories;
    }

    let backends = Backends::connect(&config).await?;
    let (_, sweeper) = build_state(config, backends);
    let report = sweeper.run_once().await;

    let status = |kind: &str| {
        if report.failed.iter().any(|f| f == kind) {
            "failed"
        } else {
            "ok"
        }
    };
    let rows = vec![
        KindRow {
            kind: "posts",
            upserted: report.posts,
            status: status("posts"),
        },
        KindRow {
            kind: "users",
            upserted: report.users,
            status: status("users"),
        },
        KindRow {
            kind: "stories",
            upserted: report.stories,
            status: status("stories"),
        },
    ];
    output::print_list(&rows, format);

    if report.failed.is_empty() {
        output::print_success("Reconciliation pass complete");
    } else {
        output::print_warning(&format!(
            "Reconciliation skipped: {}",
            report.failed.join(", ")
        ));
    }
    Ok(())
}
