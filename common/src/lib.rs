mod entry;
mod leaderboard;

pub mod ranking;

pub use entry::*;
pub use leaderboard::*;
pub use ranking::{NameTable, RankError};

pub type LeaderboardId = i32;
pub type EntryId = i32;
pub type PlayerId = uuid::Uuid;
pub type Score = i64;
pub type Rank = u64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Leaderboard name cannot be empty")]
    EmptyName,
    #[error("Min. score ({min}) must be less than max. score ({max})")]
    InvalidBounds { min: Score, max: Score },
    #[error("Number of top scores must be between 1 and 2147483647 (got {0})")]
    InvalidTopSize(u32),
    #[error("Score {score} is outside the allowed range [{min}, {max}]")]
    ScoreOutOfRange { score: Score, min: Score, max: Score },
    #[error("Entry belongs to leaderboard {expected}, not {actual}")]
    LeaderboardMismatch { expected: LeaderboardId, actual: LeaderboardId },
}
