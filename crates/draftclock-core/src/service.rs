// Draft service: the operations exposed to request handlers and the sweeper.
//
// Every method is synchronous and short. Callers pass `now` explicitly so the
// same code serves live traffic and deterministic tests.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::Database;
use crate::draft::clock::{ensure_clock_state, ClockSettings};
use crate::draft::league::MemberRole;
use crate::draft::order::{base_order, snake_order, total_rounds};
use crate::draft::queue::{self, QueueEntry};
use crate::draft::resolve::{manual_pick, Resolution};
use crate::draft::state::DraftSnapshot;
use crate::error::{DraftError, DraftResult};

/// Result of (re)initializing a league's draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitSummary {
    pub total_picks: u32,
    pub total_rounds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StalledLeague {
    pub league_id: i64,
    pub pick_number: u32,
}

/// Result of one sweep across all live leagues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub leagues_checked: u32,
    /// Picks auto-resolved by this sweep.
    pub resolved_count: u32,
    pub stalled_leagues: Vec<StalledLeague>,
    /// Leagues whose evaluation failed; they are retried on the next sweep.
    pub failed_leagues: Vec<i64>,
}

pub struct DraftService {
    db: Database,
    clock: ClockSettings,
}

impl DraftService {
    pub fn new(db: Database, clock: ClockSettings) -> Self {
        DraftService { db, clock }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Build (or rebuild) the league's snake ledger. Destructive: any
    /// previous ledger, including filled picks, is discarded.
    pub fn initialize_draft(&self, league_id: i64, requester_id: &str) -> DraftResult<InitSummary> {
        if self.db.league(league_id)?.is_none() {
            return Err(DraftError::not_found(format!("league {league_id}")));
        }

        let members = self.db.members(league_id)?;
        if members.is_empty() {
            return Err(DraftError::InvalidState(format!(
                "league {league_id} has no teams"
            )));
        }

        let is_admin = members
            .iter()
            .any(|m| m.manager_id == requester_id && m.role == MemberRole::Admin);
        if !is_admin {
            return Err(DraftError::Unauthorized {
                manager_id: requester_id.to_string(),
                action: format!("initialize the draft for league {league_id}"),
            });
        }

        let rounds = total_rounds(&self.db.roster_config(league_id)?);
        if rounds == 0 {
            return Err(DraftError::InvalidState(format!(
                "league {league_id} has no roster slots configured"
            )));
        }

        let previous = self.db.pick_count(league_id)?;
        if previous > 0 {
            warn!(
                "Re-initializing league {}: discarding {} existing picks",
                league_id, previous
            );
        }

        let ledger = snake_order(&base_order(&members), rounds);
        let total_picks = self.db.replace_picks(league_id, &ledger)? as u32;

        info!(
            "Draft initialized for league {} by {}: {} teams, {} rounds, {} picks",
            league_id,
            requester_id,
            members.len(),
            rounds,
            total_picks
        );
        Ok(InitSummary {
            total_picks,
            total_rounds: rounds,
        })
    }

    /// Evaluate the turn clock, then return the board.
    pub fn get_draft_state(&self, league_id: i64, now: DateTime<Utc>) -> DraftResult<DraftSnapshot> {
        self.get_draft_state_with(league_id, now, &mut rand::rng())
    }

    /// `get_draft_state` with a caller-supplied random source for the
    /// auto-pick fallback.
    pub fn get_draft_state_with<R: Rng + ?Sized>(
        &self,
        league_id: i64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DraftResult<DraftSnapshot> {
        let clock = ensure_clock_state(&self.db, league_id, now, &self.clock, rng)?;
        let ledger = self.db.picks(league_id)?;
        Ok(DraftSnapshot::build(league_id, clock, ledger, now))
    }

    /// A manager's explicit pick. Losing the race to a concurrent
    /// auto-resolve is reported as `Resolution::AlreadyFilled`.
    pub fn submit_pick(
        &self,
        league_id: i64,
        manager_id: &str,
        player_id: i64,
        now: DateTime<Utc>,
    ) -> DraftResult<Resolution> {
        manual_pick(&self.db, league_id, manager_id, player_id, now)
    }

    pub fn enqueue_preference(
        &self,
        league_id: i64,
        manager_id: &str,
        player_id: i64,
    ) -> DraftResult<i64> {
        queue::enqueue(&self.db, league_id, manager_id, player_id)
    }

    pub fn remove_preference(&self, queue_id: i64, manager_id: &str) -> DraftResult<()> {
        queue::remove(&self.db, queue_id, manager_id)
    }

    pub fn list_preferences(&self, league_id: i64, manager_id: &str) -> DraftResult<Vec<QueueEntry>> {
        queue::list(&self.db, league_id, manager_id)
    }

    /// Run the turn clock for every scheduled or active league.
    pub fn sweep_tick(&self, now: DateTime<Utc>) -> DraftResult<SweepReport> {
        self.sweep_tick_with(now, &mut rand::rng())
    }

    pub fn sweep_tick_with<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DraftResult<SweepReport> {
        let mut report = SweepReport::default();

        for league_id in self.db.leagues_to_sweep()? {
            report.leagues_checked += 1;
            match ensure_clock_state(&self.db, league_id, now, &self.clock, rng) {
                Ok(outcome) => {
                    report.resolved_count += outcome.resolved;
                    if let Some(pick_number) = outcome.stalled_pick {
                        report.stalled_leagues.push(StalledLeague {
                            league_id,
                            pick_number,
                        });
                    }
                }
                Err(e) => {
                    error!("Sweep failed for league {}: {}", league_id, e);
                    report.failed_leagues.push(league_id);
                }
            }
        }

        Ok(report)
    }
}
