use std::sync::Arc;

use tracing::info;

use common::{Leaderboard, LeaderboardId, LeaderboardRecord};

use crate::actor::{self, Actor};
use crate::cache::{BestEffortCache, Cache};
use crate::cache_keys::CacheKeys;
use crate::db::ScoreStore;
use crate::error::LeaderboardError;

/// Administrative leaderboard management. Every call requires an admin.
#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn ScoreStore>,
    cache: BestEffortCache,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn ScoreStore>, cache: Arc<dyn Cache>) -> Self {
        Self {
            store,
            cache: BestEffortCache::new(cache),
        }
    }

    /// Create a leaderboard. The record's id is ignored; the store assigns one.
    pub async fn create(
        &self,
        actor: Option<&Actor>,
        record: LeaderboardRecord,
    ) -> Result<Leaderboard, LeaderboardError> {
        actor::require_admin(actor)?;
        let leaderboard = Leaderboard::new(record.name, record.num_of_top_scores)?
            .with_bounds(record.min_score, record.max_score)?;

        let created = self.store.add_leaderboard(&leaderboard).await?;
        info!(
            leaderboard_id = created.id(),
            name = created.name(),
            "Created leaderboard"
        );
        Ok(created)
    }

    pub async fn get(
        &self,
        actor: Option<&Actor>,
        id: LeaderboardId,
    ) -> Result<Leaderboard, LeaderboardError> {
        actor::require_admin(actor)?;
        self.store
            .get_leaderboard(id)
            .await?
            .ok_or_else(|| LeaderboardError::not_found(format!("Leaderboard {}", id)))
    }

    pub async fn list(&self, actor: Option<&Actor>) -> Result<Vec<Leaderboard>, LeaderboardError> {
        actor::require_admin(actor)?;
        Ok(self.store.get_leaderboards().await?)
    }

    /// Apply a full edit of name, bounds and top size. Each field is
    /// re-validated; the cached top list is dropped since size and bounds
    /// shape it.
    pub async fn update(
        &self,
        actor: Option<&Actor>,
        record: LeaderboardRecord,
    ) -> Result<Leaderboard, LeaderboardError> {
        actor::require_admin(actor)?;
        let what = format!("Leaderboard {}", record.id);

        let mut leaderboard = self
            .store
            .get_leaderboard(record.id)
            .await?
            .ok_or_else(|| LeaderboardError::not_found(what.clone()))?;

        leaderboard.set_name(record.name)?;
        leaderboard.set_bounds(record.min_score, record.max_score)?;
        leaderboard.set_num_of_top_scores(record.num_of_top_scores)?;

        self.store
            .update_leaderboard(&leaderboard)
            .await
            .map_err(|e| LeaderboardError::from_store(e, what))?;
        info!(leaderboard_id = leaderboard.id(), "Updated leaderboard");

        self.cache.invalidate(&CacheKeys::top(leaderboard.id())).await;
        Ok(leaderboard)
    }

    /// Delete a leaderboard together with its entries.
    pub async fn delete(&self, actor: Option<&Actor>, id: LeaderboardId) -> Result<(), LeaderboardError> {
        actor::require_admin(actor)?;
        self.store
            .delete_leaderboard(id)
            .await
            .map_err(|e| LeaderboardError::from_store(e, format!("Leaderboard {}", id)))?;
        info!(leaderboard_id = id, "Deleted leaderboard");

        // Entry snapshots of the removed entries are left to expire; reads
        // check the leaderboard before serving them.
        self.cache.invalidate(&CacheKeys::top(id)).await;
        Ok(())
    }
}
