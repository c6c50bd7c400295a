//! Background scheduler for the campaign status sweep.
//!
//! Runs once at startup and then on a fixed interval. Concurrent sweeps are
//! harmless since every status update is conditional on the stored status.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the background sweep. The first tick fires immediately.
pub fn start_status_sweep_scheduler(state: Arc<AppState>, period: Duration) {
    tokio::spawn(async move {
        info!("Status sweep scheduler started ({}s interval)", period.as_secs());

        let mut sweep_interval = interval(period);
        sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            sweep_interval.tick().await;
            run_scheduled_sweep(&state).await;
        }
    });
}

/// Runs a single sweep and logs its outcome.
pub async fn run_scheduled_sweep(state: &Arc<AppState>) {
    let report = state.campaign_service.run_status_sweep().await;
    if report.is_noop() {
        debug!("Scheduled sweep: nothing to do");
        return;
    }
    info!(
        "Scheduled sweep completed: {} activated, {} closed",
        report.activated.len(),
        report.closed.len()
    );
    for failure in &report.failures {
        warn!("Scheduled sweep failure: {}", failure);
    }
}
