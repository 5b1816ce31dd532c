//! Rank calculation over a leaderboard population.
//!
//! Ordering is score descending, ties broken by ascending ordinal
//! comparison of the players' display names. Display names are resolved
//! by the caller and passed in as a [`NameTable`]; only players that
//! actually share a score need an entry in it.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{LeaderboardEntry, PlayerId, Rank, Score};

pub type NameTable = HashMap<PlayerId, String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankError {
    #[error("no display name resolved for player {0}")]
    UnresolvedName(PlayerId),
}

/// Players other than the target's own player holding exactly the target's score.
pub fn tied_players(target: &LeaderboardEntry, entries: &[LeaderboardEntry]) -> Vec<PlayerId> {
    same_board(target, entries)
        .filter(|e| e.score() == target.score() && e.player_id() != target.player_id())
        .map(LeaderboardEntry::player_id)
        .collect()
}

/// 1-based rank of `target`.
///
/// `entries` must contain at least every entry of the target's leaderboard
/// scoring `>= target.score()`; entries from other leaderboards are ignored.
/// When the target is tied, `names` must hold the target and every tied player.
pub fn rank(
    target: &LeaderboardEntry,
    entries: &[LeaderboardEntry],
    names: &NameTable,
) -> Result<Rank, RankError> {
    let better = same_board(target, entries)
        .filter(|e| e.score() > target.score())
        .count() as Rank;

    let tied = tied_players(target, entries);
    if tied.is_empty() {
        return Ok(better + 1);
    }

    let own_name = lookup(names, target.player_id())?;
    let mut tie_offset: Rank = 0;
    for player in tied {
        let name = lookup(names, player)?;
        match name.cmp(own_name) {
            Ordering::Less => tie_offset += 1,
            Ordering::Equal => {
                debug!("players {} and {} share display name {:?}", player, target.player_id(), name);
            }
            Ordering::Greater => {}
        }
    }

    Ok(better + tie_offset + 1)
}

/// Players whose score is shared by at least one other player in `entries`.
/// These are the only players whose names matter for ordering.
pub fn players_in_ties(entries: &[LeaderboardEntry]) -> Vec<PlayerId> {
    let mut by_score: HashMap<Score, HashSet<PlayerId>> = HashMap::new();
    for entry in entries {
        by_score.entry(entry.score()).or_default().insert(entry.player_id());
    }

    by_score
        .into_values()
        .filter(|players| players.len() > 1)
        .flatten()
        .collect()
}

/// Order two entries of the same leaderboard. Entry id is the last resort
/// for players sharing a display name.
pub fn compare(
    a: &LeaderboardEntry,
    b: &LeaderboardEntry,
    names: &NameTable,
) -> Result<Ordering, RankError> {
    let by_score = b.score().cmp(&a.score());
    if by_score != Ordering::Equal || a.player_id() == b.player_id() {
        return Ok(by_score.then_with(|| a.id().cmp(&b.id())));
    }

    let a_name = lookup(names, a.player_id())?;
    let b_name = lookup(names, b.player_id())?;
    Ok(a_name.cmp(b_name).then_with(|| a.id().cmp(&b.id())))
}

/// Sort best-first in the same order [`rank`] assigns.
pub fn sort_ranked(entries: &mut [LeaderboardEntry], names: &NameTable) -> Result<(), RankError> {
    for player in players_in_ties(entries) {
        lookup(names, player)?;
    }

    // Every player that can reach the name comparison was checked above.
    entries.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| {
                let a_name = names.get(&a.player_id()).map(String::as_str);
                let b_name = names.get(&b.player_id()).map(String::as_str);
                a_name.cmp(&b_name)
            })
            .then_with(|| a.id().cmp(&b.id()))
    });
    Ok(())
}

fn same_board<'a>(
    target: &'a LeaderboardEntry,
    entries: &'a [LeaderboardEntry],
) -> impl Iterator<Item = &'a LeaderboardEntry> + 'a {
    entries
        .iter()
        .filter(move |e| e.leaderboard_id() == target.leaderboard_id())
}

fn lookup(names: &NameTable, player: PlayerId) -> Result<&str, RankError> {
    names
        .get(&player)
        .map(String::as_str)
        .ok_or(RankError::UnresolvedName(player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Board {
        entries: Vec<LeaderboardEntry>,
        names: NameTable,
    }

    impl Board {
        fn new() -> Self {
            Self { entries: Vec::new(), names: NameTable::new() }
        }

        fn add(&mut self, name: &str, score: Score) -> LeaderboardEntry {
            let player = Uuid::new_v4();
            let id = self.entries.len() as i32 + 1;
            let entry = LeaderboardEntry::restore(id, 1, player, score);
            self.entries.push(entry.clone());
            self.names.insert(player, name.to_string());
            entry
        }

        fn rank(&self, entry: &LeaderboardEntry) -> Rank {
            rank(entry, &self.entries, &self.names).unwrap()
        }
    }

    #[test]
    fn test_tie_broken_by_display_name() {
        let mut board = Board::new();
        let zara = board.add("Zara", 100);
        let amir = board.add("Amir", 100);
        let low = board.add("Carl", 50);

        assert_eq!(board.rank(&amir), 1);
        assert_eq!(board.rank(&zara), 2);
        assert_eq!(board.rank(&low), 3);
    }

    #[test]
    fn test_single_best_entry_is_first() {
        let mut board = Board::new();
        board.add("a", 10);
        let best = board.add("b", 90);
        board.add("c", 40);

        assert_eq!(board.rank(&best), 1);
    }

    #[test]
    fn test_higher_score_always_ranks_better() {
        let mut board = Board::new();
        let entries: Vec<_> = [("m", 30), ("a", 10), ("z", 30), ("b", 20), ("y", 50)]
            .into_iter()
            .map(|(name, score)| board.add(name, score))
            .collect();

        for a in &entries {
            for b in &entries {
                if a.score() > b.score() {
                    assert!(board.rank(a) < board.rank(b));
                }
            }
        }
    }

    #[test]
    fn test_ranks_are_a_permutation_with_distinct_names() {
        let mut board = Board::new();
        for (name, score) in [("d", 5), ("c", 5), ("b", 5), ("a", 7), ("e", 1)] {
            board.add(name, score);
        }

        let mut ranks: Vec<Rank> = board.entries.iter().map(|e| board.rank(e)).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_comparison_is_case_sensitive_ordinal() {
        let mut board = Board::new();
        let lower = board.add("alice", 10);
        let upper = board.add("Bob", 10);

        // 'B' (0x42) sorts before 'a' (0x61).
        assert_eq!(board.rank(&upper), 1);
        assert_eq!(board.rank(&lower), 2);
    }

    #[test]
    fn test_untied_rank_needs_no_names() {
        let mut board = Board::new();
        let top = board.add("a", 10);
        board.add("b", 5);

        assert_eq!(rank(&top, &board.entries, &NameTable::new()), Ok(1));
    }

    #[test]
    fn test_missing_tie_name_fails() {
        let mut board = Board::new();
        let first = board.add("a", 10);
        let second = board.add("b", 10);
        board.names.remove(&second.player_id());

        assert_eq!(
            rank(&first, &board.entries, &board.names),
            Err(RankError::UnresolvedName(second.player_id()))
        );
    }

    #[test]
    fn test_other_leaderboards_ignored() {
        let mut board = Board::new();
        let mine = board.add("a", 10);
        board
            .entries
            .push(LeaderboardEntry::restore(99, 2, Uuid::new_v4(), 1000));

        assert_eq!(board.rank(&mine), 1);
    }

    #[test]
    fn test_duplicate_names_share_rank() {
        let mut board = Board::new();
        let first = board.add("twin", 10);
        let second = board.add("twin", 10);

        assert_eq!(board.rank(&first), 1);
        assert_eq!(board.rank(&second), 1);
    }

    #[test]
    fn test_sort_matches_rank() {
        let mut board = Board::new();
        let zara = board.add("Zara", 100);
        let amir = board.add("Amir", 100);
        let low = board.add("Carl", 50);
        let solo = board.add("Unnamed", 75);
        board.names.remove(&solo.player_id());

        let mut sorted = board.entries.clone();
        sort_ranked(&mut sorted, &board.names).unwrap();

        let ids: Vec<_> = sorted.iter().map(LeaderboardEntry::id).collect();
        assert_eq!(ids, vec![amir.id(), zara.id(), solo.id(), low.id()]);
    }

    #[test]
    fn test_sort_requires_tie_names() {
        let mut board = Board::new();
        board.add("a", 1);
        let b = board.add("b", 1);
        board.names.remove(&b.player_id());

        let mut sorted = board.entries.clone();
        assert_eq!(
            sort_ranked(&mut sorted, &board.names),
            Err(RankError::UnresolvedName(b.player_id()))
        );
    }

    #[test]
    fn test_compare_orders_by_score_then_name() {
        let mut board = Board::new();
        let high = board.add("z", 9);
        let tie_a = board.add("a", 5);
        let tie_b = board.add("b", 5);

        assert_eq!(compare(&high, &tie_a, &board.names), Ok(Ordering::Less));
        assert_eq!(compare(&tie_b, &tie_a, &board.names), Ok(Ordering::Greater));
        assert_eq!(compare(&tie_a, &tie_a, &board.names), Ok(Ordering::Equal));
    }

    #[test]
    fn test_players_in_ties() {
        let mut board = Board::new();
        let a = board.add("a", 3);
        let b = board.add("b", 3);
        board.add("c", 4);

        let mut tied = players_in_ties(&board.entries);
        tied.sort();
        let mut expected = vec![a.player_id(), b.player_id()];
        expected.sort();
        assert_eq!(tied, expected);
    }
}
