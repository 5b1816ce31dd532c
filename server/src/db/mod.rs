pub mod memory;
pub mod models;
pub mod postgres;
pub mod queries;

use async_trait::async_trait;

use common::{EntryId, Leaderboard, LeaderboardEntry, LeaderboardId, PlayerId, Score};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Record was modified or removed concurrently")]
    Conflict,
    /// The identity store has no such player.
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            other => StoreError::Backend(other.into()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable record of leaderboards and their entries.
///
/// The store keeps at most what it is given: the one-entry-per-player rule
/// is enforced by the submit path, not here.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    // Leaderboard operations
    async fn add_leaderboard(&self, leaderboard: &Leaderboard) -> StoreResult<Leaderboard>;
    async fn get_leaderboard(&self, id: LeaderboardId) -> StoreResult<Option<Leaderboard>>;
    async fn get_leaderboards(&self) -> StoreResult<Vec<Leaderboard>>;
    async fn update_leaderboard(&self, leaderboard: &Leaderboard) -> StoreResult<()>;
    async fn delete_leaderboard(&self, id: LeaderboardId) -> StoreResult<()>;

    // Entry operations
    async fn add_entry(&self, entry: &LeaderboardEntry) -> StoreResult<LeaderboardEntry>;
    async fn update_entry(&self, entry: &LeaderboardEntry) -> StoreResult<()>;
    async fn delete_entry(&self, id: EntryId) -> StoreResult<()>;
    async fn get_entry_by_id(&self, id: EntryId) -> StoreResult<Option<LeaderboardEntry>>;
    async fn get_entry_by_player(
        &self,
        leaderboard_id: LeaderboardId,
        player_id: PlayerId,
    ) -> StoreResult<Option<LeaderboardEntry>>;

    // Ranking queries
    /// Best `num_of_top_scores` entries by score, descending. Order among
    /// equal scores is whatever the backend yields.
    async fn get_top_n(&self, leaderboard: &Leaderboard) -> StoreResult<Vec<LeaderboardEntry>>;
    /// Every entry of the leaderboard scoring at least `score`.
    async fn get_entries_at_or_above(
        &self,
        leaderboard_id: LeaderboardId,
        score: Score,
    ) -> StoreResult<Vec<LeaderboardEntry>>;
}
