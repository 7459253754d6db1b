// Periodic sweep: advances every live draft even when no client is watching.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use draftclock_core::service::{DraftService, SweepReport};

/// Run one sweep as of `now` on the blocking pool. Returns `None` when the
/// sweep could not run; the next tick retries.
pub async fn sweep_once(service: Arc<DraftService>, now: DateTime<Utc>) -> Option<SweepReport> {
    let result = tokio::task::spawn_blocking(move || service.sweep_tick(now)).await;

    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            error!("Sweep failed: {}", e);
            return None;
        }
        Err(e) => {
            error!("Sweep task panicked or was cancelled: {}", e);
            return None;
        }
    };

    if report.resolved_count > 0 {
        info!(
            "Sweep auto-resolved {} pick(s) across {} league(s)",
            report.resolved_count, report.leagues_checked
        );
    } else {
        debug!("Sweep checked {} league(s), nothing due", report.leagues_checked);
    }
    for stalled in &report.stalled_leagues {
        error!(
            "League {} is stalled on pick {}: player pool exhausted",
            stalled.league_id, stalled.pick_number
        );
    }
    if !report.failed_leagues.is_empty() {
        warn!("Sweep could not evaluate leagues {:?}", report.failed_leagues);
    }

    Some(report)
}

/// Sweep every `interval` until `shutdown` flips to `true` or its sender is
/// dropped. Ticks missed while a slow sweep runs are skipped, not queued.
pub async fn run(service: Arc<DraftService>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    info!("Sweeper started (interval {:?})", interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep_once(Arc::clone(&service), Utc::now()).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Sweeper stopped");
}
