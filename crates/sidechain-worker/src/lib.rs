//! Background tasks for Sidechain.
//!
//! This crate provides:
//! - A supervisor owning named, individually stoppable tasks
//! - The search reconciliation sweeper
//! - The presence timeout sweep that closes silent connections

pub mod presence;
pub mod reconciliation;
pub mod supervisor;

use std::sync::Arc;
use std::time::Duration;

use sidechain_core::config::AppConfig;
use sidechain_realtime::RealtimeEngine;

pub use reconciliation::{ReconciliationSweeper, SweepReport};
pub use supervisor::{ShutdownReport, Supervisor};

/// Task name of the reconciliation sweeper.
pub const RECONCILIATION_TASK: &str = "search-reconciliation";
/// Task name of the presence timeout sweep.
pub const PRESENCE_SWEEP_TASK: &str = "presence-sweep";

/// Start the standard background tasks under `supervisor`.
pub fn start_background_tasks(
    supervisor: &Supervisor,
    config: &AppConfig,
    engine: RealtimeEngine,
    sweeper: Arc<ReconciliationSweeper>,
) {
    let every = Duration::from_secs(config.presence.sweep_interval_secs);
    supervisor.spawn(PRESENCE_SWEEP_TASK, move |cancel| {
        presence::run_presence_sweep(engine, every, cancel)
    });

    if config.reconciliation.enabled {
        supervisor.spawn(RECONCILIATION_TASK, move |cancel| sweeper.run(cancel));
    } else {
        tracing::info!("Search reconciliation disabled");
    }
}
