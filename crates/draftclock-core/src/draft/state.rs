// Read-side view of a league's draft.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::clock::ClockOutcome;
use super::pick::{DraftStatus, Pick};

/// Everything a client needs to render the draft board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSnapshot {
    pub league_id: i64,
    pub status: DraftStatus,
    pub current_pick: Option<Pick>,
    pub filled_picks: Vec<Pick>,
    /// Open picks after the current one, in draft order.
    pub upcoming_picks: Vec<Pick>,
    pub server_time: DateTime<Utc>,
    pub total_picks: u32,
    pub total_rounds: u32,
    /// Pick number the draft is paused on because the pool ran dry.
    pub stalled_pick: Option<u32>,
}

impl DraftSnapshot {
    /// Assemble a snapshot from a settled clock and the ledger as re-read
    /// afterwards.
    ///
    /// The ledger is the later read, so the current pick and the
    /// active/completed status come from it: a pick filled between the two
    /// reads never shows up as current. The clock only contributes the
    /// pre-start statuses and a stall marker that still names the current
    /// pick.
    pub fn build(
        league_id: i64,
        clock: ClockOutcome,
        ledger: Vec<Pick>,
        server_time: DateTime<Utc>,
    ) -> Self {
        let total_picks = ledger.len() as u32;
        let total_rounds = ledger.iter().map(|p| p.round_number).max().unwrap_or(0);

        let (filled_picks, mut open): (Vec<Pick>, Vec<Pick>) =
            ledger.into_iter().partition(Pick::is_filled);
        open.sort_by_key(|p| p.pick_number);

        let started = !matches!(
            clock.status,
            DraftStatus::NotStarted | DraftStatus::Scheduled
        );
        let (status, current_pick) = if !started {
            (clock.status, None)
        } else if open.is_empty() {
            (DraftStatus::Completed, None)
        } else {
            (DraftStatus::Active, Some(open.remove(0)))
        };

        let stalled_pick = clock
            .stalled_pick
            .filter(|n| current_pick.as_ref().is_some_and(|p| p.pick_number == *n));

        DraftSnapshot {
            league_id,
            status,
            current_pick,
            filled_picks,
            upcoming_picks: open,
            server_time,
            total_picks,
            total_rounds,
            stalled_pick,
        }
    }
}
