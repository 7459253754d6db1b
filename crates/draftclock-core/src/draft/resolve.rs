// Turn resolution: manual picks, queue-driven auto-picks and random fallback.
//
// Both entry points funnel into `commit`, which performs the conditional
// ledger write. Losing that write to a concurrent caller is reported as
// `Resolution::AlreadyFilled`, never as an error.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, error, info};

use crate::db::{Database, FillOutcome, PickFill};
use crate::error::{DraftError, DraftResult};

use super::league::Player;
use super::pick::Pick;
use super::roster::assign_slot;

/// What happened to the pick a caller tried to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// This caller filled the pick. Carries the stored row.
    Filled(Pick),
    /// Someone else filled it first. Carries the row as they left it.
    AlreadyFilled(Pick),
}

impl Resolution {
    pub fn pick(&self) -> &Pick {
        match self {
            Resolution::Filled(pick) | Resolution::AlreadyFilled(pick) => pick,
        }
    }

    pub fn was_filled_here(&self) -> bool {
        matches!(self, Resolution::Filled(_))
    }
}

/// Where an auto-picked player came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Manual,
    Queue(i64),
    Random,
}

/// Fill the current pick with a manager's explicit choice.
///
/// Errors: `NotFound` (league or player), `DraftNotActive`, `TurnMismatch`,
/// `PlayerTaken`.
pub fn manual_pick(
    db: &Database,
    league_id: i64,
    manager_id: &str,
    player_id: i64,
    now: DateTime<Utc>,
) -> DraftResult<Resolution> {
    let league = db
        .league(league_id)?
        .ok_or_else(|| DraftError::not_found(format!("league {league_id}")))?;

    if league.draft_start.is_some_and(|start| now < start) {
        return Err(DraftError::DraftNotActive { league_id });
    }
    let current = db
        .current_pick(league_id)?
        .ok_or(DraftError::DraftNotActive { league_id })?;

    if current.manager_id != manager_id {
        return Err(DraftError::TurnMismatch {
            pick_number: current.pick_number,
            owner: current.manager_id,
            manager_id: manager_id.to_string(),
        });
    }

    let player = db
        .player(player_id)?
        .filter(|p| p.active)
        .ok_or_else(|| DraftError::not_found(format!("player {player_id}")))?;

    if db.is_player_drafted(league_id, player_id)? {
        return Err(DraftError::PlayerTaken { player_id });
    }

    match commit(db, &current, &player, Source::Manual, now)? {
        FillOutcome::PlayerTaken => Err(DraftError::PlayerTaken { player_id }),
        outcome => reload(db, &current, outcome),
    }
}

/// Fill an expired pick on behalf of its owner.
///
/// Walks the owner's preference queue first; stale entries (drafted or no
/// longer in the pool) are skipped and left in place. Falls back to a
/// uniformly random undrafted player. Returns `Exhausted` when the pool is
/// empty; nothing is written in that case.
pub fn auto_resolve<R: Rng + ?Sized>(
    db: &Database,
    pick: &Pick,
    now: DateTime<Utc>,
    rng: &mut R,
) -> DraftResult<Resolution> {
    let league_id = pick.league_id;

    for entry in db.queue(league_id, &pick.manager_id)? {
        let Some(player) = usable_player(db, league_id, entry.player_id)? else {
            debug!(
                "Skipping stale queue entry {} (player {}) for {}",
                entry.id, entry.player_id, pick.manager_id
            );
            continue;
        };

        match commit(db, pick, &player, Source::Queue(entry.id), now)? {
            FillOutcome::PlayerTaken => continue,
            outcome => return reload(db, pick, outcome),
        }
    }

    let mut candidates = db.undrafted_players(league_id)?;
    while !candidates.is_empty() {
        let idx = rng.random_range(0..candidates.len());
        let player_id = candidates.swap_remove(idx);
        let Some(player) = db.player(player_id)? else {
            continue;
        };

        match commit(db, pick, &player, Source::Random, now)? {
            FillOutcome::PlayerTaken => continue,
            outcome => return reload(db, pick, outcome),
        }
    }

    // The pick may have been filled by someone else while we searched.
    if let Some(stored) = db.pick(pick.id)? {
        if stored.is_filled() {
            return Ok(Resolution::AlreadyFilled(stored));
        }
    }

    error!(
        "Player pool exhausted: cannot fill pick {} in league {}; draft paused until the pool is fixed",
        pick.pick_number, league_id
    );
    Err(DraftError::Exhausted {
        league_id,
        pick_number: pick.pick_number,
    })
}

/// A queued player is usable if still in the pool and not drafted.
fn usable_player(db: &Database, league_id: i64, player_id: i64) -> DraftResult<Option<Player>> {
    let Some(player) = db.player(player_id)? else {
        return Ok(None);
    };
    if !player.active || db.is_player_drafted(league_id, player_id)? {
        return Ok(None);
    }
    Ok(Some(player))
}

/// Conditional ledger write shared by every resolution path.
fn commit(
    db: &Database,
    pick: &Pick,
    player: &Player,
    source: Source,
    now: DateTime<Utc>,
) -> DraftResult<FillOutcome> {
    let roster = db.roster_config(pick.league_id)?;
    let occupied = db.occupied_slots(pick.league_id, &pick.manager_id)?;
    let roster_slot = assign_slot(&roster, &occupied, &player.positions);

    let fill = PickFill {
        league_id: pick.league_id,
        pick_id: pick.id,
        player_id: player.id,
        is_auto_picked: source != Source::Manual,
        resolved_at: now,
        roster_slot,
        consume_queue_entry: match source {
            Source::Queue(id) => Some(id),
            _ => None,
        },
    };

    let outcome = db.fill_pick(&fill)?;
    match outcome {
        FillOutcome::Filled { draft_completed } => {
            let how = match source {
                Source::Manual => "manual",
                Source::Queue(_) => "queue",
                Source::Random => "random",
            };
            info!(
                "Pick {} in league {} filled by {} with {} ({}) [{}]",
                pick.pick_number, pick.league_id, pick.manager_id, player.name, player.id, how
            );
            if draft_completed {
                info!("Draft complete for league {}", pick.league_id);
            }
        }
        FillOutcome::AlreadyFilled => {
            debug!(
                "Pick {} in league {} was filled concurrently; treating as done",
                pick.pick_number, pick.league_id
            );
        }
        FillOutcome::PlayerTaken => {
            debug!(
                "Player {} already drafted in league {}; pick {} unchanged",
                player.id, pick.league_id, pick.pick_number
            );
        }
    }
    Ok(outcome)
}

fn reload(db: &Database, pick: &Pick, outcome: FillOutcome) -> DraftResult<Resolution> {
    let stored = db
        .pick(pick.id)?
        .ok_or_else(|| DraftError::not_found(format!("pick {}", pick.id)))?;
    Ok(match outcome {
        FillOutcome::Filled { .. } => Resolution::Filled(stored),
        _ => Resolution::AlreadyFilled(stored),
    })
}
