// Error taxonomy for draft operations.

use thiserror::Error;

/// Errors returned by the draft service.
///
/// `TurnMismatch`, `PlayerTaken`, `AlreadyQueued` and `DraftNotActive` are
/// expected, user-facing outcomes and are never retried. `Exhausted` means
/// the player pool is too small for the configured rounds and needs an
/// operator; the draft stays paused on that pick until it is fixed.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("manager `{manager_id}` is not allowed to {action}")]
    Unauthorized { manager_id: String, action: String },

    #[error("pick {pick_number} belongs to `{owner}`, not `{manager_id}`")]
    TurnMismatch {
        pick_number: u32,
        owner: String,
        manager_id: String,
    },

    #[error("player {player_id} has already been drafted")]
    PlayerTaken { player_id: i64 },

    #[error("player {player_id} is already in the preference queue")]
    AlreadyQueued { player_id: i64 },

    #[error("draft for league {league_id} is not active")]
    DraftNotActive { league_id: i64 },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("no eligible players left to fill pick {pick_number} in league {league_id}")]
    Exhausted { league_id: i64, pick_number: u32 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DraftError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        DraftError::NotFound { what: what.into() }
    }

    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DraftError::Unauthorized { .. } => "UNAUTHORIZED",
            DraftError::TurnMismatch { .. } => "TURN_MISMATCH",
            DraftError::PlayerTaken { .. } => "PLAYER_TAKEN",
            DraftError::AlreadyQueued { .. } => "ALREADY_QUEUED",
            DraftError::DraftNotActive { .. } => "DRAFT_NOT_ACTIVE",
            DraftError::InvalidState(_) => "INVALID_STATE",
            DraftError::NotFound { .. } => "NOT_FOUND",
            DraftError::Exhausted { .. } => "EXHAUSTED",
            DraftError::Storage(_) => "INTERNAL",
        }
    }
}

pub type DraftResult<T> = Result<T, DraftError>;
