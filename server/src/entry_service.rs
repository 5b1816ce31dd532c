use std::sync::Arc;

use tracing::{debug, info, warn};

use common::{
    EntryId, EntrySnapshot, EntryView, Leaderboard, LeaderboardEntry, LeaderboardId, PlayerId,
    Rank, Score,
};

use crate::actor::{self, Actor};
use crate::cache::{BestEffortCache, Cache};
use crate::cache_keys::{CacheKeys, ENTRY_TTL, TOP_TTL};
use crate::db::ScoreStore;
use crate::error::LeaderboardError;
use crate::names::NameResolver;
use crate::ranking::Ranker;

/// Submit, query and delete leaderboard entries.
///
/// Entry snapshots are cached without rank; every entry read recomputes
/// rank against the store. Mutations drop both snapshot keys of the entry
/// they touch, and drop the top list only when the entry's rank lies
/// inside the top window.
#[derive(Clone)]
pub struct EntryService {
    store: Arc<dyn ScoreStore>,
    ranker: Ranker,
    cache: BestEffortCache,
}

impl EntryService {
    pub fn new(
        store: Arc<dyn ScoreStore>,
        names: Arc<dyn NameResolver>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            ranker: Ranker::new(store.clone(), names),
            store,
            cache: BestEffortCache::new(cache),
        }
    }

    /// Record `score` as the actor's entry in the leaderboard, creating the
    /// entry on first submission. Returns the entry id, which stays the same
    /// across resubmissions.
    pub async fn submit(
        &self,
        actor: Option<&Actor>,
        leaderboard_id: LeaderboardId,
        score: Score,
    ) -> Result<EntryId, LeaderboardError> {
        let actor = actor::require(actor)?;
        let leaderboard = self.load_leaderboard(leaderboard_id).await?;

        let existing = self
            .store
            .get_entry_by_player(leaderboard_id, actor.player_id)
            .await?;

        let entry = match existing {
            Some(mut entry) => {
                let previous = entry.score();
                entry.set_score(&leaderboard, score)?;
                self.store
                    .update_entry(&entry)
                    .await
                    .map_err(|e| LeaderboardError::from_store(e, format!("Entry {}", entry.id())))?;
                info!(
                    entry_id = entry.id(),
                    leaderboard_id,
                    player_id = %actor.player_id,
                    previous,
                    score,
                    "Updated leaderboard entry"
                );
                self.invalidate_entry(&entry).await;
                entry
            }
            None => {
                let entry = LeaderboardEntry::new(&leaderboard, actor.player_id, score)?;
                let entry = self.store.add_entry(&entry).await.map_err(|e| {
                    LeaderboardError::from_store(e, format!("Leaderboard {}", leaderboard_id))
                })?;
                info!(
                    entry_id = entry.id(),
                    leaderboard_id,
                    player_id = %actor.player_id,
                    score,
                    "Created leaderboard entry"
                );
                // A snapshot of an earlier, deleted entry may still sit under this key.
                self.cache
                    .invalidate(&CacheKeys::entry_by_player(leaderboard_id, actor.player_id))
                    .await;
                entry
            }
        };

        if self.affects_top(&leaderboard, &entry).await {
            self.invalidate_top(leaderboard_id).await;
        }

        Ok(entry.id())
    }

    /// Remove an entry. Only its owner or an admin may do this.
    pub async fn delete(&self, actor: Option<&Actor>, entry_id: EntryId) -> Result<(), LeaderboardError> {
        let actor = actor::require(actor)?;
        let entry = self
            .store
            .get_entry_by_id(entry_id)
            .await?
            .ok_or_else(|| LeaderboardError::not_found(format!("Entry {}", entry_id)))?;

        if !actor.can_modify(&entry) {
            warn!(
                entry_id,
                player_id = %actor.player_id,
                owner = %entry.player_id(),
                "Refusing to delete another player's entry"
            );
            return Err(LeaderboardError::Forbidden);
        }

        let leaderboard = self.load_leaderboard(entry.leaderboard_id()).await?;
        // Rank has to be taken while the entry is still in the population.
        let was_top = self.affects_top(&leaderboard, &entry).await;

        self.store
            .delete_entry(entry_id)
            .await
            .map_err(|e| LeaderboardError::from_store(e, format!("Entry {}", entry_id)))?;
        info!(
            entry_id,
            leaderboard_id = entry.leaderboard_id(),
            player_id = %entry.player_id(),
            by_admin = actor.is_admin && !actor.owns(&entry),
            "Deleted leaderboard entry"
        );

        self.invalidate_entry(&entry).await;
        if was_top {
            self.invalidate_top(entry.leaderboard_id()).await;
        }
        Ok(())
    }

    pub async fn get_by_id(&self, entry_id: EntryId) -> Result<EntryView, LeaderboardError> {
        let key = CacheKeys::entry(entry_id);
        if let Some(snapshot) = self.cache.get_json::<EntrySnapshot>(&key).await {
            debug!(entry_id, "Entry cache hit");
            return self.view_of_cached(snapshot).await;
        }

        let entry = self
            .store
            .get_entry_by_id(entry_id)
            .await?
            .ok_or_else(|| LeaderboardError::not_found(format!("Entry {}", entry_id)))?;
        self.cache.set_json(&key, &entry.snapshot(), ENTRY_TTL).await;
        self.view(&entry).await
    }

    pub async fn get_by_player(
        &self,
        player_id: PlayerId,
        leaderboard_id: LeaderboardId,
    ) -> Result<EntryView, LeaderboardError> {
        let key = CacheKeys::entry_by_player(leaderboard_id, player_id);
        if let Some(snapshot) = self.cache.get_json::<EntrySnapshot>(&key).await {
            debug!(leaderboard_id, %player_id, "Entry cache hit");
            return self.view_of_cached(snapshot).await;
        }

        let entry = self
            .store
            .get_entry_by_player(leaderboard_id, player_id)
            .await?
            .ok_or_else(|| {
                LeaderboardError::not_found(format!(
                    "Entry for player {} in leaderboard {}",
                    player_id, leaderboard_id
                ))
            })?;
        self.cache.set_json(&key, &entry.snapshot(), ENTRY_TTL).await;
        self.view(&entry).await
    }

    /// The leaderboard's top list, best first. Cached hits are returned as
    /// stored; position in the list is the rank.
    pub async fn get_top_n(&self, leaderboard: &Leaderboard) -> Result<Vec<EntrySnapshot>, LeaderboardError> {
        let key = CacheKeys::top(leaderboard.id());
        if let Some(top) = self.cache.get_json::<Vec<EntrySnapshot>>(&key).await {
            debug!(leaderboard_id = leaderboard.id(), "Top list cache hit");
            return Ok(top);
        }

        let top: Vec<EntrySnapshot> = self
            .ranker
            .top_n(leaderboard)
            .await?
            .iter()
            .map(LeaderboardEntry::snapshot)
            .collect();
        self.cache.set_json(&key, &top, TOP_TTL).await;
        Ok(top)
    }

    /// Convenience over [`EntryService::get_top_n`] for callers holding only an id.
    pub async fn get_top_n_by_id(
        &self,
        leaderboard_id: LeaderboardId,
    ) -> Result<Vec<EntrySnapshot>, LeaderboardError> {
        let leaderboard = self.load_leaderboard(leaderboard_id).await?;
        self.get_top_n(&leaderboard).await
    }

    pub async fn get_rank(
        &self,
        leaderboard_id: LeaderboardId,
        player_id: PlayerId,
    ) -> Result<Rank, LeaderboardError> {
        let entry = self
            .store
            .get_entry_by_player(leaderboard_id, player_id)
            .await?
            .ok_or_else(|| {
                LeaderboardError::not_found(format!(
                    "Entry for player {} in leaderboard {}",
                    player_id, leaderboard_id
                ))
            })?;
        self.ranker.rank(&entry).await
    }

    async fn load_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Leaderboard, LeaderboardError> {
        self.store
            .get_leaderboard(leaderboard_id)
            .await?
            .ok_or_else(|| LeaderboardError::not_found(format!("Leaderboard {}", leaderboard_id)))
    }

    async fn view_of_cached(&self, snapshot: EntrySnapshot) -> Result<EntryView, LeaderboardError> {
        // The leaderboard may have been deleted since the snapshot was cached.
        self.load_leaderboard(snapshot.leaderboard_id).await?;
        self.view(&snapshot.to_entry()).await
    }

    async fn view(&self, entry: &LeaderboardEntry) -> Result<EntryView, LeaderboardError> {
        let rank = self.ranker.rank(entry).await?;
        Ok(entry.snapshot().with_rank(rank))
    }

    /// Whether the entry currently ranks inside the top window. When rank
    /// cannot be computed the top list is treated as affected.
    async fn affects_top(&self, leaderboard: &Leaderboard, entry: &LeaderboardEntry) -> bool {
        match self.ranker.rank(entry).await {
            Ok(rank) => leaderboard.is_top_rank(rank),
            Err(e) => {
                warn!(
                    entry_id = entry.id(),
                    leaderboard_id = leaderboard.id(),
                    "Could not rank entry, dropping top list: {}",
                    e
                );
                true
            }
        }
    }

    async fn invalidate_entry(&self, entry: &LeaderboardEntry) {
        for key in CacheKeys::entry_keys(entry.id(), entry.leaderboard_id(), entry.player_id()) {
            self.cache.invalidate(&key).await;
        }
    }

    async fn invalidate_top(&self, leaderboard_id: LeaderboardId) {
        self.cache.invalidate(&CacheKeys::top(leaderboard_id)).await;
    }
}
