// Lazy turn clock: starts deadlines on first observation and hands expired
// turns to the resolution engine.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::config::DraftConfig;
use crate::db::Database;
use crate::error::{DraftError, DraftResult};

use super::pick::{DraftStatus, Pick};
use super::resolve::auto_resolve;

/// Timing knobs for the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSettings {
    /// Pick duration for leagues that do not set their own.
    pub default_pick_duration: Duration,
    /// How far past its deadline a pick must be before it is auto-resolved.
    pub grace: Duration,
}

impl Default for ClockSettings {
    fn default() -> Self {
        ClockSettings {
            default_pick_duration: Duration::seconds(60),
            grace: Duration::seconds(10),
        }
    }
}

impl From<&DraftConfig> for ClockSettings {
    fn from(config: &DraftConfig) -> Self {
        ClockSettings {
            default_pick_duration: Duration::seconds(i64::from(config.default_pick_duration_secs)),
            grace: Duration::seconds(i64::from(config.grace_period_secs)),
        }
    }
}

/// What one clock evaluation observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOutcome {
    pub status: DraftStatus,
    /// The open pick after evaluation, if the draft is active.
    pub current_pick: Option<Pick>,
    /// Picks this evaluation auto-resolved itself. Picks filled by a
    /// concurrent caller are not counted.
    pub resolved: u32,
    /// Set when the draft is paused because no eligible player remains.
    pub stalled_pick: Option<u32>,
}

impl ClockOutcome {
    fn idle(status: DraftStatus) -> Self {
        ClockOutcome {
            status,
            current_pick: None,
            resolved: 0,
            stalled_pick: None,
        }
    }
}

/// Bring a league's draft up to date as of `now`.
///
/// 1. No ledger: `NotStarted`.
/// 2. Start time in the future: `Scheduled`, nothing touched.
/// 3. No open pick: `Completed`.
/// 4. Open pick without a deadline: start its clock (conditional write).
/// 5. Open pick past deadline + grace: auto-resolve it and go back to 3.
///
/// Safe to call from any number of concurrent observers.
pub fn ensure_clock_state<R: Rng + ?Sized>(
    db: &Database,
    league_id: i64,
    now: DateTime<Utc>,
    settings: &ClockSettings,
    rng: &mut R,
) -> DraftResult<ClockOutcome> {
    let league = db
        .league(league_id)?
        .ok_or_else(|| DraftError::not_found(format!("league {league_id}")))?;

    let total = db.pick_count(league_id)?;
    if total == 0 {
        return Ok(ClockOutcome::idle(DraftStatus::NotStarted));
    }
    if league.draft_start.is_some_and(|start| now < start) {
        return Ok(ClockOutcome::idle(DraftStatus::Scheduled));
    }

    let pick_duration = league
        .pick_duration_secs
        .map(|secs| Duration::seconds(i64::from(secs)))
        .unwrap_or(settings.default_pick_duration);

    let mut resolved = 0u32;
    let mut activated = false;

    // Every pass either returns or sees one open pick get filled, so the
    // ledger length bounds the cascade.
    for _ in 0..=total {
        let Some(mut current) = db.current_pick(league_id)? else {
            if db.mark_completed(league_id)? {
                info!("Draft complete for league {}", league_id);
            }
            return Ok(ClockOutcome {
                status: DraftStatus::Completed,
                current_pick: None,
                resolved,
                stalled_pick: None,
            });
        };

        if !activated {
            if db.mark_active(league_id)? {
                info!("Draft for league {} is now live", league_id);
            }
            activated = true;
        }

        if current.deadline.is_none() {
            let deadline = now + pick_duration;
            if db.assign_deadline(current.id, deadline)? {
                debug!(
                    "Clock started for pick {} in league {}: deadline {}",
                    current.pick_number, league_id, deadline
                );
            }
            // Winner or not, the stored row is the truth.
            match db.pick(current.id)? {
                Some(stored) if !stored.is_filled() => current = stored,
                _ => continue,
            }
        }

        if !current.is_expired(now, settings.grace) {
            return Ok(ClockOutcome {
                status: DraftStatus::Active,
                current_pick: Some(current),
                resolved,
                stalled_pick: None,
            });
        }

        match auto_resolve(db, &current, now, rng) {
            Ok(resolution) => {
                if resolution.was_filled_here() {
                    resolved += 1;
                }
            }
            Err(DraftError::Exhausted { pick_number, .. }) => {
                return Ok(ClockOutcome {
                    status: DraftStatus::Active,
                    current_pick: Some(current),
                    resolved,
                    stalled_pick: Some(pick_number),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Err(DraftError::InvalidState(format!(
        "clock for league {league_id} did not settle after {total} picks"
    )))
}
