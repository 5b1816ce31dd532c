use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;

use common::ranking::{self, NameTable};
use common::{Leaderboard, LeaderboardEntry, PlayerId, Rank};

use crate::db::ScoreStore;
use crate::error::LeaderboardError;
use crate::names::NameResolver;

/// Live rank computation against the score store.
///
/// Only entries at or above the target's score are loaded, and display
/// names are fetched only for players that share a score.
#[derive(Clone)]
pub struct Ranker {
    store: Arc<dyn ScoreStore>,
    names: Arc<dyn NameResolver>,
}

impl Ranker {
    pub fn new(store: Arc<dyn ScoreStore>, names: Arc<dyn NameResolver>) -> Self {
        Self { store, names }
    }

    pub async fn rank(&self, entry: &LeaderboardEntry) -> Result<Rank, LeaderboardError> {
        let population = self
            .store
            .get_entries_at_or_above(entry.leaderboard_id(), entry.score())
            .await?;

        let tied = ranking::tied_players(entry, &population);
        let names = if tied.is_empty() {
            NameTable::new()
        } else {
            let mut players = tied;
            players.push(entry.player_id());
            self.resolve(players).await?
        };

        Ok(ranking::rank(entry, &population, &names)?)
    }

    /// Best `num_of_top_scores` entries in rank order.
    ///
    /// When the store's cut lands inside a group of equal scores, the whole
    /// group is loaded so the name tie-break decides who makes the list.
    pub async fn top_n(&self, leaderboard: &Leaderboard) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let limit = leaderboard.num_of_top_scores() as usize;
        let top = self.store.get_top_n(leaderboard).await?;

        let cutoff = if top.len() >= limit {
            top.last().map(LeaderboardEntry::score)
        } else {
            None
        };
        let mut candidates = match cutoff {
            Some(score) => {
                self.store
                    .get_entries_at_or_above(leaderboard.id(), score)
                    .await?
            }
            None => top,
        };

        let names = self.resolve(ranking::players_in_ties(&candidates)).await?;
        ranking::sort_ranked(&mut candidates, &names)?;
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn resolve(&self, players: Vec<PlayerId>) -> Result<NameTable, LeaderboardError> {
        let unique: HashSet<PlayerId> = players.into_iter().collect();
        let lookups = unique.into_iter().map(|player| {
            let names = self.names.clone();
            async move { (player, names.display_name(player).await) }
        });

        let mut table = NameTable::new();
        for (player, result) in join_all(lookups).await {
            let name = result.map_err(|e| LeaderboardError::resolution(player, e))?;
            table.insert(player, name);
        }
        Ok(table)
    }
}
