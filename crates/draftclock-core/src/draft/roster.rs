// Roster slot assignment for drafted players.

use std::collections::{BTreeMap, HashMap};

/// Slots any player may fill regardless of position.
const FLEX_SLOTS: &[&str] = &["FLEX", "UTIL", "OP"];

/// Bench slots, used once every starting slot that fits is taken.
const BENCH_SLOTS: &[&str] = &["BN", "BE"];

/// Pick the roster slot for a newly drafted player.
///
/// `roster_config` is the league's slot -> count table; `occupied` lists the
/// slots the manager has already filled in this draft (duplicates count).
///
/// Slot assignment priority:
/// 1. A slot named after one of the player's positions
/// 2. A flex slot (FLEX, UTIL, OP)
/// 3. A bench slot (BN, BE)
///
/// Returns `None` when nothing fits; the pick is still valid, the player is
/// simply left unassigned.
pub fn assign_slot(
    roster_config: &BTreeMap<String, u32>,
    occupied: &[String],
    positions: &[String],
) -> Option<String> {
    let mut used: HashMap<String, u32> = HashMap::new();
    for slot in occupied {
        *used.entry(slot.to_uppercase()).or_insert(0) += 1;
    }

    let open = |slot: &str| -> Option<String> {
        let (name, count) = roster_config
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(slot))?;
        let filled = used.get(&name.to_uppercase()).copied().unwrap_or(0);
        (filled < *count).then(|| name.clone())
    };

    // 1. Dedicated position slot
    for pos in positions {
        if let Some(slot) = open(pos) {
            return Some(slot);
        }
    }

    // 2. Flex
    for flex in FLEX_SLOTS {
        if let Some(slot) = open(flex) {
            return Some(slot);
        }
    }

    // 3. Bench
    BENCH_SLOTS.iter().find_map(|bench| open(bench))
}
