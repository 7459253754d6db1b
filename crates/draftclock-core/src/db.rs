// SQLite persistence layer for leagues, the pick ledger and preference queues.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::draft::league::{League, Member, MemberRole, Player};
use crate::draft::pick::{DraftStatus, NewPick, Pick};
use crate::draft::queue::QueueEntry;
use crate::pool::PoolPlayer;

/// Columns selected for every `Pick` read, in `pick_from_row` order.
const PICK_COLUMNS: &str = "id, league_id, round_number, pick_number, manager_id, player_id,
     deadline, is_auto_picked, resolved_at, roster_slot";

/// Everything needed to fill one ledger row.
#[derive(Debug, Clone)]
pub struct PickFill {
    pub league_id: i64,
    pub pick_id: i64,
    pub player_id: i64,
    pub is_auto_picked: bool,
    pub resolved_at: DateTime<Utc>,
    pub roster_slot: Option<String>,
    /// Queue entry to delete in the same transaction, if the player came
    /// from the owner's preference queue.
    pub consume_queue_entry: Option<i64>,
}

/// Result of a conditional fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// This caller filled the pick. `draft_completed` is set when it was the
    /// last open pick in the league.
    Filled { draft_completed: bool },
    /// Another caller filled the pick first. Nothing was written.
    AlreadyFilled,
    /// The player is already on another pick in this league. Nothing was written.
    PlayerTaken,
}

/// SQLite-backed store for the draft.
///
/// Each handle owns one connection. Several handles (or processes) may open
/// the same file; every mutation that must not race is a conditional write.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS leagues (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                name               TEXT NOT NULL UNIQUE,
                draft_status       TEXT NOT NULL DEFAULT 'not_started',
                draft_start        TEXT,
                pick_duration_secs INTEGER
            );

            CREATE TABLE IF NOT EXISTS league_members (
                league_id      INTEGER NOT NULL REFERENCES leagues(id),
                manager_id     TEXT NOT NULL,
                team_name      TEXT NOT NULL,
                role           TEXT NOT NULL,
                draft_position INTEGER,
                UNIQUE(league_id, manager_id)
            );

            CREATE TABLE IF NOT EXISTS roster_slots (
                league_id INTEGER NOT NULL REFERENCES leagues(id),
                slot      TEXT NOT NULL,
                count     INTEGER NOT NULL,
                PRIMARY KEY (league_id, slot)
            );

            CREATE TABLE IF NOT EXISTS players (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                name      TEXT NOT NULL,
                team      TEXT NOT NULL,
                positions TEXT NOT NULL,
                active    INTEGER NOT NULL DEFAULT 1,
                UNIQUE(name, team)
            );

            CREATE TABLE IF NOT EXISTS picks (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id      INTEGER NOT NULL REFERENCES leagues(id),
                round_number   INTEGER NOT NULL,
                pick_number    INTEGER NOT NULL,
                manager_id     TEXT NOT NULL,
                player_id      INTEGER REFERENCES players(id),
                deadline       TEXT,
                is_auto_picked INTEGER NOT NULL DEFAULT 0,
                resolved_at    TEXT,
                roster_slot    TEXT,
                UNIQUE(league_id, pick_number),
                UNIQUE(league_id, player_id)
            );

            CREATE INDEX IF NOT EXISTS idx_picks_open
                ON picks(league_id, pick_number) WHERE player_id IS NULL;

            CREATE TABLE IF NOT EXISTS preference_queue (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id  INTEGER NOT NULL REFERENCES leagues(id),
                manager_id TEXT NOT NULL,
                player_id  INTEGER NOT NULL REFERENCES players(id),
                rank_order INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                UNIQUE(league_id, manager_id, rank_order),
                UNIQUE(league_id, manager_id, player_id)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Leagues and membership
    // ------------------------------------------------------------------

    /// Create a league and return its id. The draft starts out `not_started`.
    pub fn create_league(
        &self,
        name: &str,
        draft_start: Option<DateTime<Utc>>,
        pick_duration_secs: Option<u32>,
    ) -> Result<i64> {
        let conn = self.conn();
        let id: i64 = conn
            .query_row(
                "INSERT INTO leagues (name, draft_start, pick_duration_secs)
                 VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![name, draft_start, pick_duration_secs],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to create league {name}"))?;
        Ok(id)
    }

    pub fn league(&self, league_id: i64) -> Result<Option<League>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, draft_status, draft_start, pick_duration_secs
             FROM leagues WHERE id = ?1",
            params![league_id],
            league_from_row,
        )
        .optional()
        .context("failed to load league")
    }

    pub fn league_by_name(&self, name: &str) -> Result<Option<League>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, draft_status, draft_start, pick_duration_secs
             FROM leagues WHERE name = ?1",
            params![name],
            league_from_row,
        )
        .optional()
        .context("failed to load league by name")
    }

    /// Change the scheduled start of a league's draft.
    pub fn set_draft_start(&self, league_id: i64, draft_start: Option<DateTime<Utc>>) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE leagues SET draft_start = ?1 WHERE id = ?2",
            params![draft_start, league_id],
        )
        .context("failed to set draft start")?;
        Ok(())
    }

    /// Ids of leagues the periodic sweep should evaluate.
    pub fn leagues_to_sweep(&self) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id FROM leagues
                 WHERE draft_status IN ('scheduled', 'active')
                 ORDER BY id",
            )
            .context("failed to prepare leagues_to_sweep query")?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .context("failed to query sweepable leagues")?
            .collect::<std::result::Result<Vec<i64>, _>>()
            .context("failed to map league rows")?;
        Ok(ids)
    }

    /// Move the cached status from `scheduled` to `active`. Returns `true` if
    /// this call made the transition.
    pub fn mark_active(&self, league_id: i64) -> Result<bool> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE leagues SET draft_status = 'active'
                 WHERE id = ?1 AND draft_status = 'scheduled'",
                params![league_id],
            )
            .context("failed to mark league active")?;
        Ok(changed == 1)
    }

    /// Move the cached status to `completed`. Returns `true` if this call made
    /// the transition.
    pub fn mark_completed(&self, league_id: i64) -> Result<bool> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE leagues SET draft_status = 'completed'
                 WHERE id = ?1 AND draft_status != 'completed'",
                params![league_id],
            )
            .context("failed to mark league completed")?;
        Ok(changed == 1)
    }

    /// Add a team to a league. Re-adding an existing manager updates the row.
    pub fn add_member(
        &self,
        league_id: i64,
        manager_id: &str,
        team_name: &str,
        role: MemberRole,
        draft_position: Option<u32>,
    ) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO league_members (league_id, manager_id, team_name, role, draft_position)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(league_id, manager_id) DO UPDATE SET
                team_name      = excluded.team_name,
                role           = excluded.role,
                draft_position = excluded.draft_position",
            params![league_id, manager_id, team_name, role.as_str(), draft_position],
        )
        .context("failed to add league member")?;
        Ok(())
    }

    /// League members in join order.
    pub fn members(&self, league_id: i64) -> Result<Vec<Member>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT league_id, manager_id, team_name, role, draft_position
                 FROM league_members WHERE league_id = ?1 ORDER BY rowid",
            )
            .context("failed to prepare members query")?;
        let members = stmt
            .query_map(params![league_id], member_from_row)
            .context("failed to query members")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map member rows")?;
        Ok(members)
    }

    pub fn member(&self, league_id: i64, manager_id: &str) -> Result<Option<Member>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT league_id, manager_id, team_name, role, draft_position
             FROM league_members WHERE league_id = ?1 AND manager_id = ?2",
            params![league_id, manager_id],
            member_from_row,
        )
        .optional()
        .context("failed to load member")
    }

    /// Set how many of `slot` each team rosters. Overwrites any earlier count.
    pub fn set_roster_slot(&self, league_id: i64, slot: &str, count: u32) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO roster_slots (league_id, slot, count) VALUES (?1, ?2, ?3)",
            params![league_id, slot, count],
        )
        .context("failed to set roster slot")?;
        Ok(())
    }

    /// The league's roster configuration: slot name -> count.
    pub fn roster_config(&self, league_id: i64) -> Result<BTreeMap<String, u32>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT slot, count FROM roster_slots WHERE league_id = ?1")
            .context("failed to prepare roster_config query")?;
        let rows = stmt
            .query_map(params![league_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })
            .context("failed to query roster slots")?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .context("failed to map roster slot rows")?;
        Ok(rows)
    }

    // ------------------------------------------------------------------
    // Player pool
    // ------------------------------------------------------------------

    /// Insert a player or update their record if a `(name, team)` row already
    /// exists. Returns the player's row id in a single atomic statement.
    ///
    /// `positions` is stored as a JSON array string (e.g. `["RB","WR"]`).
    pub fn upsert_player(&self, name: &str, team: &str, positions: &[String]) -> Result<i64> {
        let conn = self.conn();
        let positions_json =
            serde_json::to_string(positions).context("failed to serialize positions")?;

        let id: i64 = conn
            .query_row(
                "INSERT INTO players (name, team, positions)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(name, team) DO UPDATE SET
                    positions = excluded.positions
                 RETURNING id",
                params![name, team, positions_json],
                |row| row.get(0),
            )
            .context("failed to upsert player")?;
        Ok(id)
    }

    /// Make `players` the draftable pool, in a single transaction.
    ///
    /// Listed players are upserted and marked active. Players missing from
    /// the batch keep their rows (picks may reference them) but become
    /// inactive. Returns how many rows were written.
    pub fn import_players(&self, players: &[PoolPlayer]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("failed to begin import transaction")?;

        tx.execute("UPDATE players SET active = 0", [])
            .context("failed to retire previous pool")?;

        for player in players {
            let positions_json = serde_json::to_string(&player.positions)
                .context("failed to serialize positions")?;
            tx.execute(
                "INSERT INTO players (name, team, positions, active)
                 VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT(name, team) DO UPDATE SET
                    positions = excluded.positions,
                    active    = 1",
                params![player.name, player.team, positions_json],
            )
            .context("failed to upsert player in batch")?;
        }

        tx.commit().context("failed to commit import")?;
        Ok(players.len())
    }

    #[cfg(test)]
    pub(crate) fn set_player_active(&self, player_id: i64, active: bool) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE players SET active = ?1 WHERE id = ?2",
            params![active, player_id],
        )
        .context("failed to update player active flag")?;
        Ok(())
    }

    pub fn player(&self, player_id: i64) -> Result<Option<Player>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, team, positions, active FROM players WHERE id = ?1",
            params![player_id],
            |row| {
                let positions_json: String = row.get(3)?;
                let positions = serde_json::from_str(&positions_json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                })?;
                Ok(Player {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    team: row.get(2)?,
                    positions,
                    active: row.get(4)?,
                })
            },
        )
        .optional()
        .context("failed to load player")
    }

    /// Whether `player_id` is already on any pick in the league.
    pub fn is_player_drafted(&self, league_id: i64, player_id: i64) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM picks WHERE league_id = ?1 AND player_id = ?2)",
                params![league_id, player_id],
                |row| row.get(0),
            )
            .context("failed to check drafted player")?;
        Ok(exists)
    }

    /// Active players not yet drafted in the league, ordered by id.
    pub fn undrafted_players(&self, league_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id FROM players
                 WHERE active = 1
                   AND id NOT IN (
                       SELECT player_id FROM picks
                       WHERE league_id = ?1 AND player_id IS NOT NULL
                   )
                 ORDER BY id",
            )
            .context("failed to prepare undrafted_players query")?;
        let ids = stmt
            .query_map(params![league_id], |row| row.get(0))
            .context("failed to query undrafted players")?
            .collect::<std::result::Result<Vec<i64>, _>>()
            .context("failed to map player rows")?;
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Pick ledger
    // ------------------------------------------------------------------

    /// Discard the league's ledger and write `picks` in its place, moving the
    /// league to `scheduled`. Runs in one transaction so readers never see a
    /// half-built ledger.
    pub fn replace_picks(&self, league_id: i64, picks: &[NewPick]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("failed to begin replace_picks transaction")?;

        tx.execute("DELETE FROM picks WHERE league_id = ?1", params![league_id])
            .context("failed to delete previous picks")?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO picks (league_id, round_number, pick_number, manager_id)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .context("failed to prepare pick insert")?;
            for pick in picks {
                stmt.execute(params![
                    league_id,
                    pick.round_number,
                    pick.pick_number,
                    pick.manager_id
                ])
                .context("failed to insert pick")?;
            }
        }

        tx.execute(
            "UPDATE leagues SET draft_status = 'scheduled' WHERE id = ?1",
            params![league_id],
        )
        .context("failed to schedule league")?;

        tx.commit().context("failed to commit replace_picks")?;
        Ok(picks.len())
    }

    /// The whole ledger for a league, ordered by pick number.
    pub fn picks(&self, league_id: i64) -> Result<Vec<Pick>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PICK_COLUMNS} FROM picks WHERE league_id = ?1 ORDER BY pick_number"
            ))
            .context("failed to prepare picks query")?;
        let picks = stmt
            .query_map(params![league_id], pick_from_row)
            .context("failed to query picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pick rows")?;
        Ok(picks)
    }

    /// Number of ledger rows for the league.
    pub fn pick_count(&self, league_id: i64) -> Result<u32> {
        let conn = self.conn();
        let count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM picks WHERE league_id = ?1",
                params![league_id],
                |row| row.get(0),
            )
            .context("failed to count picks")?;
        Ok(count)
    }

    /// The current pick: the lowest-numbered unfilled row.
    ///
    /// A single statement, so a pick filled by a concurrent writer is either
    /// fully visible as filled or not yet filled; it never shows as current
    /// after its fill committed.
    pub fn current_pick(&self, league_id: i64) -> Result<Option<Pick>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {PICK_COLUMNS} FROM picks
                 WHERE league_id = ?1 AND player_id IS NULL
                 ORDER BY pick_number LIMIT 1"
            ),
            params![league_id],
            pick_from_row,
        )
        .optional()
        .context("failed to load current pick")
    }

    pub fn pick(&self, pick_id: i64) -> Result<Option<Pick>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PICK_COLUMNS} FROM picks WHERE id = ?1"),
            params![pick_id],
            pick_from_row,
        )
        .optional()
        .context("failed to load pick")
    }

    /// Start a pick's clock if nobody has yet. Returns `true` if this call set
    /// the deadline; `false` means another caller won (or the pick is filled).
    pub fn assign_deadline(&self, pick_id: i64, deadline: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE picks SET deadline = ?1
                 WHERE id = ?2 AND deadline IS NULL AND player_id IS NULL",
                params![deadline, pick_id],
            )
            .context("failed to assign pick deadline")?;
        Ok(changed == 1)
    }

    /// Fill a pick if it is still open.
    ///
    /// The fill, the queue-entry consumption and the completion flag are one
    /// transaction: either all of them land or none do.
    pub fn fill_pick(&self, fill: &PickFill) -> Result<FillOutcome> {
        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("failed to begin fill_pick transaction")?;

        let updated = match tx.execute(
            "UPDATE picks
             SET player_id = ?1, resolved_at = ?2, is_auto_picked = ?3, roster_slot = ?4
             WHERE id = ?5 AND league_id = ?6 AND player_id IS NULL",
            params![
                fill.player_id,
                fill.resolved_at,
                fill.is_auto_picked,
                fill.roster_slot,
                fill.pick_id,
                fill.league_id
            ],
        ) {
            Ok(n) => n,
            Err(e) if is_unique_violation(&e) => return Ok(FillOutcome::PlayerTaken),
            Err(e) => return Err(e).context("failed to fill pick"),
        };

        if updated == 0 {
            return Ok(FillOutcome::AlreadyFilled);
        }

        if let Some(queue_id) = fill.consume_queue_entry {
            tx.execute(
                "DELETE FROM preference_queue WHERE id = ?1",
                params![queue_id],
            )
            .context("failed to consume queue entry")?;
        }

        let remaining: u32 = tx
            .query_row(
                "SELECT COUNT(*) FROM picks WHERE league_id = ?1 AND player_id IS NULL",
                params![fill.league_id],
                |row| row.get(0),
            )
            .context("failed to count open picks")?;

        let draft_completed = remaining == 0;
        if draft_completed {
            tx.execute(
                "UPDATE leagues SET draft_status = 'completed' WHERE id = ?1",
                params![fill.league_id],
            )
            .context("failed to complete league")?;
        }

        tx.commit().context("failed to commit fill_pick")?;
        Ok(FillOutcome::Filled { draft_completed })
    }

    /// Roster slots a manager has filled so far in the league's draft.
    pub fn occupied_slots(&self, league_id: i64, manager_id: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT roster_slot FROM picks
                 WHERE league_id = ?1 AND manager_id = ?2 AND roster_slot IS NOT NULL",
            )
            .context("failed to prepare occupied_slots query")?;
        let slots = stmt
            .query_map(params![league_id, manager_id], |row| row.get(0))
            .context("failed to query occupied slots")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .context("failed to map slot rows")?;
        Ok(slots)
    }

    // ------------------------------------------------------------------
    // Preference queue
    // ------------------------------------------------------------------

    /// Append a player to the end of a manager's queue. Returns the new
    /// entry's id, or `None` if the player is already queued.
    ///
    /// The rank is computed inside the insert statement, so two concurrent
    /// appends never collide on `rank_order`.
    pub fn enqueue(&self, league_id: i64, manager_id: &str, player_id: i64) -> Result<Option<i64>> {
        let conn = self.conn();
        let result = conn.query_row(
            "INSERT INTO preference_queue (league_id, manager_id, player_id, rank_order)
             SELECT ?1, ?2, ?3, COALESCE(MAX(rank_order), 0) + 1
             FROM preference_queue WHERE league_id = ?1 AND manager_id = ?2
             RETURNING id",
            params![league_id, manager_id, player_id],
            |row| row.get(0),
        );
        match result {
            Ok(id) => Ok(Some(id)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("failed to enqueue preference"),
        }
    }

    /// A manager's queue, highest preference first.
    pub fn queue(&self, league_id: i64, manager_id: &str) -> Result<Vec<QueueEntry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, league_id, manager_id, player_id, rank_order
                 FROM preference_queue
                 WHERE league_id = ?1 AND manager_id = ?2
                 ORDER BY rank_order",
            )
            .context("failed to prepare queue query")?;
        let entries = stmt
            .query_map(params![league_id, manager_id], |row| {
                Ok(QueueEntry {
                    id: row.get(0)?,
                    league_id: row.get(1)?,
                    manager_id: row.get(2)?,
                    player_id: row.get(3)?,
                    rank_order: row.get(4)?,
                })
            })
            .context("failed to query preference queue")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map queue rows")?;
        Ok(entries)
    }

    /// Delete a queue entry owned by `manager_id`. Returns `false` if no such
    /// entry exists for that manager.
    pub fn remove_queue_entry(&self, queue_id: i64, manager_id: &str) -> Result<bool> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "DELETE FROM preference_queue WHERE id = ?1 AND manager_id = ?2",
                params![queue_id, manager_id],
            )
            .context("failed to remove queue entry")?;
        Ok(changed == 1)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn pick_from_row(row: &Row<'_>) -> rusqlite::Result<Pick> {
    Ok(Pick {
        id: row.get(0)?,
        league_id: row.get(1)?,
        round_number: row.get(2)?,
        pick_number: row.get(3)?,
        manager_id: row.get(4)?,
        player_id: row.get(5)?,
        deadline: row.get(6)?,
        is_auto_picked: row.get(7)?,
        resolved_at: row.get(8)?,
        roster_slot: row.get(9)?,
    })
}

fn league_from_row(row: &Row<'_>) -> rusqlite::Result<League> {
    let status: String = row.get(2)?;
    Ok(League {
        id: row.get(0)?,
        name: row.get(1)?,
        draft_status: DraftStatus::from_db_str(&status).unwrap_or(DraftStatus::NotStarted),
        draft_start: row.get(3)?,
        pick_duration_secs: row.get(4)?,
    })
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    let role: String = row.get(3)?;
    Ok(Member {
        league_id: row.get(0)?,
        manager_id: row.get(1)?,
        team_name: row.get(2)?,
        role: MemberRole::from_db_str(&role).unwrap_or(MemberRole::Manager),
        draft_position: row.get(4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
