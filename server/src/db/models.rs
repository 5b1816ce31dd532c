use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use common::{Leaderboard, LeaderboardEntry, ValidationError};

#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub id: i32,
    pub name: String,
    pub min_score: i64,
    pub max_score: i64,
    pub num_of_top_scores: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LeaderboardRow> for Leaderboard {
    type Error = ValidationError;

    fn try_from(row: LeaderboardRow) -> Result<Self, Self::Error> {
        let num_of_top_scores =
            u32::try_from(row.num_of_top_scores).map_err(|_| ValidationError::InvalidTopSize(0))?;
        Leaderboard::restore(row.id, row.name, row.min_score, row.max_score, num_of_top_scores)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub id: i32,
    pub leaderboard_id: i32,
    pub player_id: Uuid,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<EntryRow> for LeaderboardEntry {
    fn from(row: EntryRow) -> Self {
        LeaderboardEntry::restore(row.id, row.leaderboard_id, row.player_id, row.score)
    }
}

/// A player known to the identity store. Only the display name matters here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
}
