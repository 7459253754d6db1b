// Snake pick-order generation.

use std::collections::BTreeMap;

use super::league::Member;
use super::pick::NewPick;

/// Number of rounds a league drafts: one per configured roster slot,
/// bench and reserve slots included.
pub fn total_rounds(roster_config: &BTreeMap<String, u32>) -> u32 {
    roster_config.values().sum()
}

/// Base team order for round 1.
///
/// Members with a configured draft position come first, ascending; the rest
/// follow in the order they were passed in (join order).
pub fn base_order(members: &[Member]) -> Vec<String> {
    let mut indexed: Vec<(usize, &Member)> = members.iter().enumerate().collect();
    indexed.sort_by_key(|(join_idx, m)| (m.draft_position.is_none(), m.draft_position, *join_idx));
    indexed
        .into_iter()
        .map(|(_, m)| m.manager_id.clone())
        .collect()
}

/// Build the full ledger for `rounds` rounds over `teams`.
///
/// Odd rounds run the base order forward, even rounds run it reversed.
/// Pick numbers are global and contiguous starting at 1.
pub fn snake_order(teams: &[String], rounds: u32) -> Vec<NewPick> {
    let mut picks = Vec::with_capacity(teams.len() * rounds as usize);
    let mut pick_number = 0u32;

    for round in 1..=rounds {
        let ordered: Vec<&String> = if round % 2 == 1 {
            teams.iter().collect()
        } else {
            teams.iter().rev().collect()
        };
        for manager_id in ordered {
            pick_number += 1;
            picks.push(NewPick {
                round_number: round,
                pick_number,
                manager_id: manager_id.clone(),
            });
        }
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::league::MemberRole;

    fn member(id: &str, draft_position: Option<u32>) -> Member {
        Member {
            league_id: 1,
            manager_id: id.to_string(),
            team_name: format!("Team {id}"),
            role: MemberRole::Manager,
            draft_position,
        }
    }

    fn teams(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn four_teams_two_rounds_snake() {
        let picks = snake_order(&teams(&["A", "B", "C", "D"]), 2);
        let owners: Vec<&str> = picks.iter().map(|p| p.manager_id.as_str()).collect();
        assert_eq!(owners, vec!["A", "B", "C", "D", "D", "C", "B", "A"]);

        assert_eq!(picks[3].round_number, 1);
        assert_eq!(picks[4].round_number, 2);
        assert_eq!(picks[4].pick_number, 5);
    }

    #[test]
    fn pick_numbers_are_contiguous_from_one() {
        let picks = snake_order(&teams(&["A", "B", "C"]), 7);
        assert_eq!(picks.len(), 21);
        for (idx, pick) in picks.iter().enumerate() {
            assert_eq!(pick.pick_number as usize, idx + 1);
        }
    }

    #[test]
    fn third_round_runs_forward_again() {
        let picks = snake_order(&teams(&["A", "B"]), 3);
        let owners: Vec<&str> = picks.iter().map(|p| p.manager_id.as_str()).collect();
        assert_eq!(owners, vec!["A", "B", "B", "A", "A", "B"]);
    }

    #[test]
    fn single_team_picks_every_turn() {
        let picks = snake_order(&teams(&["solo"]), 4);
        assert_eq!(picks.len(), 4);
        assert!(picks.iter().all(|p| p.manager_id == "solo"));
    }

    #[test]
    fn zero_rounds_yields_empty_ledger() {
        assert!(snake_order(&teams(&["A", "B"]), 0).is_empty());
    }

    #[test]
    fn total_rounds_counts_bench_slots() {
        let mut roster = BTreeMap::new();
        roster.insert("QB".to_string(), 1);
        roster.insert("RB".to_string(), 2);
        roster.insert("BN".to_string(), 3);
        roster.insert("IR".to_string(), 1);
        assert_eq!(total_rounds(&roster), 7);
    }

    #[test]
    fn base_order_prefers_configured_positions() {
        let members = vec![
            member("first_joined", None),
            member("slot_two", Some(2)),
            member("second_joined", None),
            member("slot_one", Some(1)),
        ];
        assert_eq!(
            base_order(&members),
            teams(&["slot_one", "slot_two", "first_joined", "second_joined"])
        );
    }
}
