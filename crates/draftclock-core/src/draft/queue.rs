// Per-manager preference queues, consulted when a turn times out.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Database;
use crate::error::{DraftError, DraftResult};

/// One ranked entry in a manager's queue. Lower `rank_order` is preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub league_id: i64,
    pub manager_id: String,
    pub player_id: i64,
    pub rank_order: u32,
}

/// Append `player_id` to the end of the manager's queue.
pub fn enqueue(db: &Database, league_id: i64, manager_id: &str, player_id: i64) -> DraftResult<i64> {
    if db.league(league_id)?.is_none() {
        return Err(DraftError::not_found(format!("league {league_id}")));
    }
    if db.member(league_id, manager_id)?.is_none() {
        return Err(DraftError::Unauthorized {
            manager_id: manager_id.to_string(),
            action: format!("queue players in league {league_id}"),
        });
    }
    if db.player(player_id)?.is_none() {
        return Err(DraftError::not_found(format!("player {player_id}")));
    }
    if db.is_player_drafted(league_id, player_id)? {
        return Err(DraftError::PlayerTaken { player_id });
    }

    let queue_id = db
        .enqueue(league_id, manager_id, player_id)?
        .ok_or(DraftError::AlreadyQueued { player_id })?;

    info!(
        "Manager {} queued player {} in league {} (entry {})",
        manager_id, player_id, league_id, queue_id
    );
    Ok(queue_id)
}

/// Remove one of the manager's own entries. Entries of other managers are
/// reported as not found.
pub fn remove(db: &Database, queue_id: i64, manager_id: &str) -> DraftResult<()> {
    if db.remove_queue_entry(queue_id, manager_id)? {
        Ok(())
    } else {
        Err(DraftError::not_found(format!("queue entry {queue_id}")))
    }
}

/// The manager's queue in preference order.
pub fn list(db: &Database, league_id: i64, manager_id: &str) -> DraftResult<Vec<QueueEntry>> {
    if db.member(league_id, manager_id)?.is_none() {
        return Err(DraftError::Unauthorized {
            manager_id: manager_id.to_string(),
            action: format!("view queues in league {league_id}"),
        });
    }
    Ok(db.queue(league_id, manager_id)?)
}
