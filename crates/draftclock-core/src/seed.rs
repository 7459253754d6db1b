// Startup seeding of the league described in league.toml.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::LeagueSeed;
use crate::db::Database;

/// Make sure the configured league exists. Returns its id and whether it was
/// created by this call. A league that already exists (matched by name) is
/// left exactly as it is, so edits to league.toml after the first run do not
/// disturb a draft in progress.
pub fn ensure_seed_league(db: &Database, seed: &LeagueSeed) -> Result<(i64, bool)> {
    if let Some(existing) = db.league_by_name(&seed.name)? {
        info!(
            "League '{}' already exists (id {}, status {})",
            existing.name, existing.id, existing.draft_status
        );
        return Ok((existing.id, false));
    }

    let league_id = db
        .create_league(&seed.name, seed.draft_start, seed.pick_duration_secs)
        .with_context(|| format!("failed to seed league {}", seed.name))?;

    for team in &seed.teams {
        db.add_member(
            league_id,
            &team.manager_id,
            &team.team_name,
            team.role,
            team.draft_position,
        )?;
    }
    for (slot, count) in &seed.roster {
        db.set_roster_slot(league_id, slot, *count)?;
    }

    info!(
        "Seeded league '{}' (id {}) with {} teams and {} roster slots",
        seed.name,
        league_id,
        seed.teams.len(),
        seed.roster.values().sum::<u32>()
    );
    Ok((league_id, true))
}
