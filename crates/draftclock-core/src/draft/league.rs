// League, membership and player-pool records the draft reads from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pick::DraftStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    /// Cached status, used by the sweep to find candidate leagues.
    pub draft_status: DraftStatus,
    /// When the first turn may start. `None` means as soon as the ledger exists.
    pub draft_start: Option<DateTime<Utc>>,
    /// Per-pick duration override; falls back to the configured default.
    pub pick_duration_secs: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[serde(alias = "commissioner")]
    Admin,
    Manager,
}

impl MemberRole {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" | "commissioner" => Some(MemberRole::Admin),
            "manager" => Some(MemberRole::Manager),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Manager => "manager",
        }
    }
}

/// A team in the league. Admins are managers too and draft like everyone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub league_id: i64,
    pub manager_id: String,
    pub team_name: String,
    pub role: MemberRole,
    /// Configured draft slot; members without one follow in join order.
    pub draft_position: Option<u32>,
}

/// A player in the draftable pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub positions: Vec<String>,
    /// Inactive players stay in the table but can no longer be drafted.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_accepts_commissioner_alias() {
        assert_eq!(MemberRole::from_db_str("admin"), Some(MemberRole::Admin));
        assert_eq!(MemberRole::from_db_str("Commissioner"), Some(MemberRole::Admin));
        assert_eq!(MemberRole::from_db_str("manager"), Some(MemberRole::Manager));
        assert_eq!(MemberRole::from_db_str("owner"), None);
    }
}
