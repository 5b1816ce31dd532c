use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{EntryId, Leaderboard, LeaderboardEntry, LeaderboardId, PlayerId, Score};

use super::{ScoreStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    leaderboards: BTreeMap<LeaderboardId, Leaderboard>,
    entries: BTreeMap<EntryId, LeaderboardEntry>,
    next_leaderboard_id: LeaderboardId,
    next_entry_id: EntryId,
}

/// Process-local store for tests and local runs. Entries are kept in id
/// order, so equal scores come back in insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn board_entries<'a>(
        tables: &'a Tables,
        leaderboard_id: LeaderboardId,
    ) -> impl Iterator<Item = &'a LeaderboardEntry> + 'a {
        tables
            .entries
            .values()
            .filter(move |e| e.leaderboard_id() == leaderboard_id)
    }
}

#[async_trait]
impl ScoreStore for InMemoryStore {
    async fn add_leaderboard(&self, leaderboard: &Leaderboard) -> StoreResult<Leaderboard> {
        let mut tables = self.tables.write().await;
        tables.next_leaderboard_id += 1;
        let stored = leaderboard.clone().with_id(tables.next_leaderboard_id);
        tables.leaderboards.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn get_leaderboard(&self, id: LeaderboardId) -> StoreResult<Option<Leaderboard>> {
        Ok(self.tables.read().await.leaderboards.get(&id).cloned())
    }

    async fn get_leaderboards(&self) -> StoreResult<Vec<Leaderboard>> {
        Ok(self.tables.read().await.leaderboards.values().cloned().collect())
    }

    async fn update_leaderboard(&self, leaderboard: &Leaderboard) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.leaderboards.get_mut(&leaderboard.id()) {
            Some(stored) => {
                *stored = leaderboard.clone();
                Ok(())
            }
            None => Err(StoreError::Conflict),
        }
    }

    async fn delete_leaderboard(&self, id: LeaderboardId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.leaderboards.remove(&id).ok_or(StoreError::NotFound)?;
        tables.entries.retain(|_, e| e.leaderboard_id() != id);
        Ok(())
    }

    async fn add_entry(&self, entry: &LeaderboardEntry) -> StoreResult<LeaderboardEntry> {
        let mut tables = self.tables.write().await;
        if !tables.leaderboards.contains_key(&entry.leaderboard_id()) {
            return Err(StoreError::NotFound);
        }
        tables.next_entry_id += 1;
        let stored = entry.clone().with_id(tables.next_entry_id);
        tables.entries.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update_entry(&self, entry: &LeaderboardEntry) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.entries.get_mut(&entry.id()) {
            Some(stored) => {
                *stored = entry.clone();
                Ok(())
            }
            None => Err(StoreError::Conflict),
        }
    }

    async fn delete_entry(&self, id: EntryId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.entries.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn get_entry_by_id(&self, id: EntryId) -> StoreResult<Option<LeaderboardEntry>> {
        Ok(self.tables.read().await.entries.get(&id).cloned())
    }

    async fn get_entry_by_player(
        &self,
        leaderboard_id: LeaderboardId,
        player_id: PlayerId,
    ) -> StoreResult<Option<LeaderboardEntry>> {
        let tables = self.tables.read().await;
        Ok(Self::board_entries(&tables, leaderboard_id)
            .find(|e| e.player_id() == player_id)
            .cloned())
    }

    async fn get_top_n(&self, leaderboard: &Leaderboard) -> StoreResult<Vec<LeaderboardEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<LeaderboardEntry> =
            Self::board_entries(&tables, leaderboard.id()).cloned().collect();
        // Stable: ties stay in id order.
        entries.sort_by(|a, b| b.score().cmp(&a.score()));
        entries.truncate(leaderboard.num_of_top_scores() as usize);
        Ok(entries)
    }

    async fn get_entries_at_or_above(
        &self,
        leaderboard_id: LeaderboardId,
        score: Score,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        let tables = self.tables.read().await;
        Ok(Self::board_entries(&tables, leaderboard_id)
            .filter(|e| e.score() >= score)
            .cloned()
            .collect())
    }
}
