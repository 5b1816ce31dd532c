use common::{PlayerId, RankError, ValidationError};

use crate::db::StoreError;
use crate::names::NameError;

/// Failures surfaced by the leaderboard services. None are retried here.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Not allowed to act on this resource")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to resolve display name for player {player}: {reason}")]
    ResolutionFailure { player: PlayerId, reason: String },
    #[error("Score store failure")]
    Store(#[source] anyhow::Error),
}

impl LeaderboardError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Map a store error, naming the record a missing row or a lost
    /// concurrent update refers to.
    pub fn from_store(err: StoreError, what: impl Into<String>) -> Self {
        match err {
            StoreError::NotFound | StoreError::Conflict => Self::NotFound(what.into()),
            // The caller's identity has no player behind it.
            StoreError::UnknownPlayer(_) => Self::Unauthorized,
            StoreError::Backend(e) => Self::Store(e),
        }
    }

    pub fn resolution(player: PlayerId, err: NameError) -> Self {
        let reason = match err {
            NameError::UnknownPlayer(_) => "unknown player".to_string(),
            NameError::Backend(e) => format!("{:#}", e),
        };
        Self::ResolutionFailure { player, reason }
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        Self::from_store(err, "Record")
    }
}

impl From<RankError> for LeaderboardError {
    fn from(err: RankError) -> Self {
        match err {
            RankError::UnresolvedName(player) => Self::ResolutionFailure {
                player,
                reason: "name missing from resolved table".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_service_errors() {
        assert!(matches!(
            LeaderboardError::from_store(StoreError::NotFound, "Leaderboard 7"),
            LeaderboardError::NotFound(what) if what == "Leaderboard 7"
        ));
        assert!(matches!(
            LeaderboardError::from_store(StoreError::Conflict, "Entry 3"),
            LeaderboardError::NotFound(_)
        ));
        assert!(matches!(
            LeaderboardError::from_store(StoreError::UnknownPlayer(uuid::Uuid::new_v4()), "Leaderboard 7"),
            LeaderboardError::Unauthorized
        ));
        assert!(matches!(
            LeaderboardError::from(StoreError::Backend(anyhow::anyhow!("connection reset"))),
            LeaderboardError::Store(_)
        ));
    }
}
