use anyhow::{Context, Result};
use async_trait::async_trait;
use refinery::config::{Config, ConfigDbType};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use common::{EntryId, Leaderboard, LeaderboardEntry, LeaderboardId, PlayerId, Score};

use super::models::{EntryRow, LeaderboardRow, Player};
use super::queries;
use super::{ScoreStore, StoreError, StoreResult};
use crate::config::DatabaseConfig;
use crate::names::{NameError, NameResolver};

mod migrations {
    use refinery::embed_migrations;
    embed_migrations!("./migrations");
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(db: &DatabaseConfig) -> Result<()> {
    let mut config = Config::new(ConfigDbType::Postgres)
        .set_db_host(&db.host)
        .set_db_port(&db.port)
        .set_db_user(&db.user)
        .set_db_pass(&db.pass)
        .set_db_name(&db.name);

    let report = migrations::migrations::runner()
        .run_async(&mut config)
        .await
        .context("Failed to run database migrations")?;
    info!(applied = report.applied_migrations().len(), "Database migrations completed");
    Ok(())
}

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(db: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .connect(&db.url())
            .await
            .context("Failed to create PostgreSQL connection pool")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn upsert_player(&self, player: &Player) -> Result<()> {
        sqlx::query(queries::UPSERT_PLAYER)
            .bind(player.id)
            .bind(&player.username)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to upsert player {}", player.id))?;
        Ok(())
    }

    fn to_leaderboard(row: LeaderboardRow) -> StoreResult<Leaderboard> {
        let id = row.id;
        Leaderboard::try_from(row)
            .with_context(|| format!("Stored leaderboard {} violates its invariants", id))
            .map_err(StoreError::Backend)
    }

    fn top_size(leaderboard: &Leaderboard) -> StoreResult<i32> {
        i32::try_from(leaderboard.num_of_top_scores())
            .with_context(|| {
                format!(
                    "Top size {} of leaderboard {} does not fit the column",
                    leaderboard.num_of_top_scores(),
                    leaderboard.id()
                )
            })
            .map_err(StoreError::Backend)
    }

    /// Foreign-key failures on insert mean the leaderboard or the player is gone.
    fn entry_insert_error(err: sqlx::Error, player_id: PlayerId) -> StoreError {
        if let sqlx::Error::Database(db) = &err {
            if db.is_foreign_key_violation() {
                return match db.constraint() {
                    Some(queries::ENTRY_PLAYER_FK) => StoreError::UnknownPlayer(player_id),
                    _ => StoreError::NotFound,
                };
            }
        }
        err.into()
    }
}

#[async_trait]
impl ScoreStore for PostgresStore {
    async fn add_leaderboard(&self, leaderboard: &Leaderboard) -> StoreResult<Leaderboard> {
        let row: LeaderboardRow = sqlx::query_as(queries::INSERT_LEADERBOARD)
            .bind(leaderboard.name())
            .bind(leaderboard.min_score())
            .bind(leaderboard.max_score())
            .bind(Self::top_size(leaderboard)?)
            .fetch_one(&self.pool)
            .await?;
        Self::to_leaderboard(row)
    }

    async fn get_leaderboard(&self, id: LeaderboardId) -> StoreResult<Option<Leaderboard>> {
        let row: Option<LeaderboardRow> = sqlx::query_as(queries::SELECT_LEADERBOARD)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::to_leaderboard).transpose()
    }

    async fn get_leaderboards(&self) -> StoreResult<Vec<Leaderboard>> {
        let rows: Vec<LeaderboardRow> = sqlx::query_as(queries::SELECT_LEADERBOARDS)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::to_leaderboard).collect()
    }

    async fn update_leaderboard(&self, leaderboard: &Leaderboard) -> StoreResult<()> {
        let result = sqlx::query(queries::UPDATE_LEADERBOARD)
            .bind(leaderboard.id())
            .bind(leaderboard.name())
            .bind(leaderboard.min_score())
            .bind(leaderboard.max_score())
            .bind(Self::top_size(leaderboard)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(leaderboard_id = leaderboard.id(), "Leaderboard update touched no rows");
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn delete_leaderboard(&self, id: LeaderboardId) -> StoreResult<()> {
        let result = sqlx::query(queries::DELETE_LEADERBOARD)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn add_entry(&self, entry: &LeaderboardEntry) -> StoreResult<LeaderboardEntry> {
        let row: EntryRow = sqlx::query_as(queries::INSERT_ENTRY)
            .bind(entry.leaderboard_id())
            .bind(entry.player_id())
            .bind(entry.score())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::entry_insert_error(e, entry.player_id()))?;
        Ok(row.into())
    }

    async fn update_entry(&self, entry: &LeaderboardEntry) -> StoreResult<()> {
        let result = sqlx::query(queries::UPDATE_ENTRY_SCORE)
            .bind(entry.id())
            .bind(entry.score())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(entry_id = entry.id(), "Entry update touched no rows");
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn delete_entry(&self, id: EntryId) -> StoreResult<()> {
        let result = sqlx::query(queries::DELETE_ENTRY)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_entry_by_id(&self, id: EntryId) -> StoreResult<Option<LeaderboardEntry>> {
        let row: Option<EntryRow> = sqlx::query_as(queries::SELECT_ENTRY_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_entry_by_player(
        &self,
        leaderboard_id: LeaderboardId,
        player_id: PlayerId,
    ) -> StoreResult<Option<LeaderboardEntry>> {
        let row: Option<EntryRow> = sqlx::query_as(queries::SELECT_ENTRY_BY_PLAYER)
            .bind(leaderboard_id)
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_top_n(&self, leaderboard: &Leaderboard) -> StoreResult<Vec<LeaderboardEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(queries::SELECT_TOP_N)
            .bind(leaderboard.id())
            .bind(i64::from(leaderboard.num_of_top_scores()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_entries_at_or_above(
        &self,
        leaderboard_id: LeaderboardId,
        score: Score,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(queries::SELECT_ENTRIES_AT_OR_ABOVE)
            .bind(leaderboard_id)
            .bind(score)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl NameResolver for PostgresStore {
    async fn display_name(&self, player_id: PlayerId) -> Result<String, NameError> {
        let name: Option<String> = sqlx::query_scalar(queries::SELECT_PLAYER_NAME)
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query player name")?;

        name.ok_or(NameError::UnknownPlayer(player_id))
    }
}
