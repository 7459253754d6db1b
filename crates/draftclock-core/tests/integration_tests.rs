// Integration tests for the draft engine.
//
// These exercise the public service API end-to-end against real SQLite
// stores: whole drafts driven by manual picks, polls and sweeps, the
// cascade after an outage, and concurrent resolution from independent
// handles sharing one database file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Barrier;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use draftclock_core::db::Database;
use draftclock_core::draft::clock::ClockSettings;
use draftclock_core::draft::league::MemberRole;
use draftclock_core::draft::pick::{DraftStatus, Pick};
use draftclock_core::draft::resolve::Resolution;
use draftclock_core::error::DraftError;
use draftclock_core::pool::PoolPlayer;
use draftclock_core::service::DraftService;

// ===========================================================================
// Test helpers
// ===========================================================================

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 19, 0, 0).unwrap()
}

/// A pool of `count` players cycling through QB/RB/WR/TE.
fn pool(count: usize) -> Vec<PoolPlayer> {
    const POSITIONS: [&str; 4] = ["QB", "RB", "WR", "TE"];
    (0..count)
        .map(|i| PoolPlayer {
            name: format!("Player {i}"),
            team: "FA".into(),
            positions: vec![POSITIONS[i % 4].to_string()],
        })
        .collect()
}

/// Create the standard test league in `db`: teams A-D (A is admin), a
/// QB/RB/FLEX/BN roster (4 rounds) and `players` players. Returns the
/// league id.
fn setup_league(db: &Database, players: usize) -> i64 {
    let league = db.create_league("Integration League", None, Some(60)).unwrap();
    for (id, role) in [
        ("A", MemberRole::Admin),
        ("B", MemberRole::Manager),
        ("C", MemberRole::Manager),
        ("D", MemberRole::Manager),
    ] {
        db.add_member(league, id, &format!("Team {id}"), role, None).unwrap();
    }
    for slot in ["QB", "RB", "FLEX", "BN"] {
        db.set_roster_slot(league, slot, 1).unwrap();
    }
    db.import_players(&pool(players)).unwrap();
    league
}

fn service_with_league(players: usize) -> (DraftService, i64) {
    let db = Database::open(":memory:").unwrap();
    let league = setup_league(&db, players);
    let svc = DraftService::new(db, ClockSettings::default());
    svc.initialize_draft(league, "A").unwrap();
    (svc, league)
}

/// A fresh on-disk database path, unique per test name and process.
fn temp_db_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "draftclock_it_{name}_{}.db",
        std::process::id()
    ));
    remove_db_files(&path);
    path
}

fn remove_db_files(path: &Path) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(format!("{}-wal", path.display()));
    let _ = std::fs::remove_file(format!("{}-shm", path.display()));
}

/// The ledger-wide invariants that must hold in every reachable state.
fn assert_ledger_invariants(ledger: &[Pick]) {
    // pick numbers are exactly 1..=n
    for (idx, pick) in ledger.iter().enumerate() {
        assert_eq!(pick.pick_number as usize, idx + 1, "pick numbers must be contiguous");
    }

    // fills happen strictly in order
    let first_open = ledger.iter().position(|p| !p.is_filled()).unwrap_or(ledger.len());
    assert!(
        ledger[first_open..].iter().all(|p| !p.is_filled()),
        "a pick after the current pick is filled"
    );

    // no player drafted twice
    let mut seen = HashSet::new();
    for player in ledger.iter().filter_map(|p| p.player_id) {
        assert!(seen.insert(player), "player {player} drafted twice");
    }
}

// ===========================================================================
// Initialization
// ===========================================================================

#[test]
fn initialization_produces_contiguous_snake_ledger() {
    let (svc, league) = service_with_league(40);
    let ledger = svc.db().picks(league).unwrap();
    assert_eq!(ledger.len(), 16);
    assert_ledger_invariants(&ledger);

    let owners: String = ledger.iter().map(|p| p.manager_id.as_str()).collect();
    assert_eq!(owners, "ABCDDCBAABCDDCBA");
}

// ===========================================================================
// Turn clock
// ===========================================================================

#[test]
fn polling_within_grace_is_idempotent() {
    let (svc, league) = service_with_league(40);

    let first = svc.get_draft_state(league, t0()).unwrap();
    let second = svc
        .get_draft_state(league, t0() + Duration::seconds(69))
        .unwrap();

    let a = first.current_pick.unwrap();
    let b = second.current_pick.unwrap();
    assert_eq!(a.pick_number, b.pick_number);
    assert_eq!(a.deadline, b.deadline);
    assert_eq!(second.filled_picks.len(), 0);
}

#[test]
fn outage_cascade_resolves_every_expired_turn() {
    let (svc, league) = service_with_league(40);
    // Three picks whose clocks started before the outage.
    for pick in svc.db().picks(league).unwrap().iter().take(3) {
        svc.db().assign_deadline(pick.id, t0()).unwrap();
    }

    let now = t0() + Duration::minutes(3);
    let mut rng = StdRng::seed_from_u64(2026);
    let snap = svc.get_draft_state_with(league, now, &mut rng).unwrap();

    assert_eq!(snap.filled_picks.len(), 3);
    assert!(snap.filled_picks.iter().all(|p| p.is_auto_picked));
    assert!(snap.filled_picks.iter().all(|p| p.resolved_at == Some(now)));

    let current = snap.current_pick.unwrap();
    assert_eq!(current.pick_number, 4);
    assert_eq!(current.deadline, Some(now + Duration::seconds(60)));
    assert_eq!(snap.upcoming_picks.len(), 12);
    assert_ledger_invariants(&svc.db().picks(league).unwrap());
}

#[test]
fn single_expired_pick_after_long_outage() {
    let (svc, league) = service_with_league(40);
    svc.get_draft_state(league, t0()).unwrap();

    let snap = svc
        .get_draft_state(league, t0() + Duration::minutes(4))
        .unwrap();
    assert_eq!(snap.filled_picks.len(), 1);
    assert_eq!(snap.current_pick.unwrap().pick_number, 2);
}

#[test]
fn future_start_keeps_draft_scheduled() {
    let db = Database::open(":memory:").unwrap();
    let league = setup_league(&db, 40);
    db.set_draft_start(league, Some(t0() + Duration::hours(2))).unwrap();
    let svc = DraftService::new(db, ClockSettings::default());
    svc.initialize_draft(league, "A").unwrap();

    let snap = svc.get_draft_state(league, t0()).unwrap();
    assert_eq!(snap.status, DraftStatus::Scheduled);
    assert!(snap.current_pick.is_none());

    let err = svc.submit_pick(league, "A", 1, t0()).unwrap_err();
    assert!(matches!(err, DraftError::DraftNotActive { .. }));

    let live = svc
        .get_draft_state(league, t0() + Duration::hours(2))
        .unwrap();
    assert_eq!(live.status, DraftStatus::Active);
}

// ===========================================================================
// Resolution
// ===========================================================================

#[test]
fn stale_queue_entry_skipped_on_auto_resolve() {
    let (svc, league) = service_with_league(40);
    let players = svc.db().undrafted_players(league).unwrap();
    let (x, y) = (players[0], players[1]);

    // B queues [X, Y]; A drafts X.
    svc.enqueue_preference(league, "B", x).unwrap();
    let y_entry = svc.enqueue_preference(league, "B", y).unwrap();
    svc.get_draft_state(league, t0()).unwrap();
    svc.submit_pick(league, "A", x, t0()).unwrap();

    // B's clock starts, then expires.
    svc.get_draft_state(league, t0()).unwrap();
    let snap = svc
        .get_draft_state(league, t0() + Duration::seconds(71))
        .unwrap();

    let b_pick = &snap.filled_picks[1];
    assert_eq!(b_pick.manager_id, "B");
    assert_eq!(b_pick.player_id, Some(y));
    assert!(b_pick.is_auto_picked);

    let remaining = svc.list_preferences(league, "B").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].player_id, x);
    assert_ne!(remaining[0].id, y_entry);
}

#[test]
fn manual_errors_are_distinguishable() {
    let (svc, league) = service_with_league(40);
    let players = svc.db().undrafted_players(league).unwrap();

    let err = svc.submit_pick(league, "B", players[0], t0()).unwrap_err();
    assert_eq!(err.kind(), "TURN_MISMATCH");

    svc.submit_pick(league, "A", players[0], t0()).unwrap();
    let err = svc.submit_pick(league, "B", players[0], t0()).unwrap_err();
    assert_eq!(err.kind(), "PLAYER_TAKEN");
}

#[test]
fn last_eligible_player_is_always_chosen() {
    // 16 picks, 16 players: the final auto-pick has exactly one candidate.
    let (svc, league) = service_with_league(16);
    let players = svc.db().undrafted_players(league).unwrap();

    // Fill the first 15 picks manually, in order.
    for (i, pick) in svc.db().picks(league).unwrap().iter().take(15).enumerate() {
        let res = svc.submit_pick(league, &pick.manager_id, players[i], t0()).unwrap();
        assert!(res.was_filled_here());
    }

    let last = svc.db().current_pick(league).unwrap().unwrap();
    svc.db().assign_deadline(last.id, t0()).unwrap();

    let mut rng = StdRng::seed_from_u64(31337);
    let snap = svc
        .get_draft_state_with(league, t0() + Duration::minutes(1), &mut rng)
        .unwrap();
    assert_eq!(snap.status, DraftStatus::Completed);
    assert_eq!(snap.filled_picks[15].player_id, Some(players[15]));
}

#[test]
fn undersized_pool_pauses_draft_until_fixed() {
    let (svc, league) = service_with_league(2);
    for pick in svc.db().picks(league).unwrap().iter().take(3) {
        svc.db().assign_deadline(pick.id, t0()).unwrap();
    }

    let now = t0() + Duration::minutes(3);
    let snap = svc.get_draft_state(league, now).unwrap();
    assert_eq!(snap.filled_picks.len(), 2);
    assert_eq!(snap.stalled_pick, Some(3));
    assert_eq!(snap.current_pick.as_ref().unwrap().pick_number, 3);

    // Operator re-imports the pool with one more player; the next read
    // resumes the draft.
    let mut bigger = pool(2);
    bigger.push(PoolPlayer {
        name: "Late Addition".into(),
        team: "FA".into(),
        positions: vec!["WR".into()],
    });
    svc.db().import_players(&bigger).unwrap();
    let resumed = svc.get_draft_state(league, now).unwrap();
    assert_eq!(resumed.filled_picks.len(), 3);
    assert_eq!(resumed.stalled_pick, None);
    let late = resumed.filled_picks[2].player_id.unwrap();
    assert_eq!(svc.db().player(late).unwrap().unwrap().name, "Late Addition");
}

#[test]
fn sweeps_alone_complete_the_draft() {
    let (svc, league) = service_with_league(40);
    let mut rng = StdRng::seed_from_u64(4);
    let mut now = t0();

    // Each pair of sweeps starts one clock and expires it.
    for _ in 0..40 {
        svc.sweep_tick_with(now, &mut rng).unwrap();
        now += Duration::seconds(71);
        if svc.db().current_pick(league).unwrap().is_none() {
            break;
        }
    }

    let ledger = svc.db().picks(league).unwrap();
    assert!(ledger.iter().all(|p| p.is_filled()));
    assert_ledger_invariants(&ledger);
    assert_eq!(
        svc.db().league(league).unwrap().unwrap().draft_status,
        DraftStatus::Completed
    );
    // Completed leagues drop out of the sweep.
    assert_eq!(svc.sweep_tick(now).unwrap().leagues_checked, 0);
}

#[test]
fn mixed_manual_and_auto_draft_keeps_invariants() {
    let (svc, league) = service_with_league(40);
    let mut rng = StdRng::seed_from_u64(77);
    let mut now = t0();

    for turn in 0..16 {
        let snap = svc.get_draft_state_with(league, now, &mut rng).unwrap();
        assert_ledger_invariants(&svc.db().picks(league).unwrap());
        let Some(current) = snap.current_pick else {
            break;
        };
        if turn % 3 == 0 {
            // Let this one time out.
            now += Duration::seconds(75);
            continue;
        }
        let player = svc.db().undrafted_players(league).unwrap()[0];
        svc.submit_pick(league, &current.manager_id, player, now).unwrap();
        now += Duration::seconds(5);
    }

    let final_state = svc.get_draft_state_with(league, now, &mut rng).unwrap();
    assert_ledger_invariants(&svc.db().picks(league).unwrap());
    assert!(final_state.filled_picks.len() >= 10);
}

// ===========================================================================
// Concurrency
// ===========================================================================

#[test]
fn concurrent_submit_and_sweep_assign_exactly_one_player() {
    for round in 0..8 {
        let path = temp_db_path(&format!("race_{round}"));
        let path_str = path.to_str().unwrap().to_string();

        let league = {
            let db = Database::open(&path_str).unwrap();
            setup_league(&db, 40)
        };
        let viewer = DraftService::new(Database::open(&path_str).unwrap(), ClockSettings::default());
        let sweeper = DraftService::new(Database::open(&path_str).unwrap(), ClockSettings::default());
        viewer.initialize_draft(league, "A").unwrap();

        let first = viewer.db().current_pick(league).unwrap().unwrap();
        viewer.db().assign_deadline(first.id, t0()).unwrap();
        let wanted = viewer.db().undrafted_players(league).unwrap()[5];
        let now = t0() + Duration::minutes(2);

        let barrier = Barrier::new(2);
        let (manual, sweep) = std::thread::scope(|s| {
            let manual = s.spawn(|| {
                barrier.wait();
                viewer.submit_pick(league, "A", wanted, now)
            });
            let sweep = s.spawn(|| {
                barrier.wait();
                sweeper.sweep_tick(now)
            });
            (manual.join().unwrap(), sweep.join().unwrap())
        });

        let sweep = sweep.unwrap();
        let stored = viewer.db().pick(first.id).unwrap().unwrap();
        assert!(stored.player_id.is_some(), "pick left empty");

        match manual {
            Ok(Resolution::Filled(pick)) => {
                assert_eq!(stored.player_id, Some(wanted));
                assert!(!pick.is_auto_picked);
            }
            Ok(Resolution::AlreadyFilled(pick)) => {
                assert!(pick.is_auto_picked);
                assert!(sweep.resolved_count >= 1);
            }
            // The sweep filled pick 1 before the manual request read the board.
            Err(DraftError::TurnMismatch { .. }) => assert!(stored.is_auto_picked),
            // The sweep's random fallback landed on the same player first.
            Err(DraftError::PlayerTaken { player_id }) => {
                assert_eq!(player_id, wanted);
                assert!(stored.is_auto_picked);
            }
            Err(other) => panic!("unexpected manual pick error: {other}"),
        }

        let ledger = viewer.db().picks(league).unwrap();
        assert_ledger_invariants(&ledger);

        drop(viewer);
        drop(sweeper);
        remove_db_files(&path);
    }
}

#[test]
fn overlapping_sweeps_never_double_resolve() {
    let path = temp_db_path("overlapping_sweeps");
    let path_str = path.to_str().unwrap().to_string();

    let league = {
        let db = Database::open(&path_str).unwrap();
        setup_league(&db, 40)
    };
    let services: Vec<DraftService> = (0..4)
        .map(|_| DraftService::new(Database::open(&path_str).unwrap(), ClockSettings::default()))
        .collect();
    services[0].initialize_draft(league, "A").unwrap();
    for pick in services[0].db().picks(league).unwrap().iter().take(5) {
        services[0].db().assign_deadline(pick.id, t0()).unwrap();
    }

    let now = t0() + Duration::minutes(10);
    let barrier = Barrier::new(services.len());
    let resolved: u32 = std::thread::scope(|s| {
        let handles: Vec<_> = services
            .iter()
            .map(|svc| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    svc.sweep_tick(now).unwrap().resolved_count
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    let ledger = services[0].db().picks(league).unwrap();
    let filled = ledger.iter().filter(|p| p.is_filled()).count();
    assert_eq!(filled, 5);
    assert_eq!(resolved, 5, "each fill is credited to exactly one sweeper");
    assert_ledger_invariants(&ledger);

    // Exactly one clock started on pick 6, shared by everyone.
    let current = services[0].db().current_pick(league).unwrap().unwrap();
    assert_eq!(current.pick_number, 6);
    assert_eq!(current.deadline, Some(now + Duration::seconds(60)));

    drop(services);
    remove_db_files(&path);
}
