// Pick ledger rows and the league draft status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a league's draft.
///
/// Derived from the ledger contents and the configured start time; callers
/// never set it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    NotStarted,
    Scheduled,
    Active,
    Completed,
}

impl DraftStatus {
    /// Parse the value stored in the `leagues.draft_status` column.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(DraftStatus::NotStarted),
            "scheduled" => Some(DraftStatus::Scheduled),
            "active" => Some(DraftStatus::Active),
            "completed" => Some(DraftStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::NotStarted => "not_started",
            DraftStatus::Scheduled => "scheduled",
            DraftStatus::Active => "active",
            DraftStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger row: one slot in the draft order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub id: i64,
    pub league_id: i64,
    /// 1-based round this pick belongs to.
    pub round_number: u32,
    /// Global, 1-based position across the whole draft.
    pub pick_number: u32,
    /// Manager who owns this turn.
    pub manager_id: String,
    /// `None` until the pick is filled.
    pub player_id: Option<i64>,
    /// Set lazily when the pick first becomes current and is observed.
    pub deadline: Option<DateTime<Utc>>,
    pub is_auto_picked: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Roster slot the player landed in, once filled.
    pub roster_slot: Option<String>,
}

impl Pick {
    pub fn is_filled(&self) -> bool {
        self.player_id.is_some()
    }

    /// Whether the deadline has passed by more than `grace`.
    ///
    /// Picks without a deadline never expire; their clock has not started.
    pub fn is_expired(&self, now: DateTime<Utc>, grace: chrono::Duration) -> bool {
        match self.deadline {
            Some(deadline) => now > deadline + grace,
            None => false,
        }
    }
}

/// A ledger row before it is written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPick {
    pub round_number: u32,
    pub pick_number: u32,
    pub manager_id: String,
}
