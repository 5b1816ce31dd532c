use serde::{Deserialize, Serialize};

use crate::{EntryId, Leaderboard, LeaderboardId, PlayerId, Rank, Score, ValidationError};

/// One player's current score in one leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    id: EntryId,
    leaderboard_id: LeaderboardId,
    player_id: PlayerId,
    score: Score,
}

impl LeaderboardEntry {
    /// Create an unsaved entry (id `0`), checking the score against the
    /// leaderboard's bounds.
    pub fn new(
        leaderboard: &Leaderboard,
        player_id: PlayerId,
        score: Score,
    ) -> Result<Self, ValidationError> {
        leaderboard.check_score(score)?;
        Ok(Self {
            id: 0,
            leaderboard_id: leaderboard.id(),
            player_id,
            score,
        })
    }

    /// Rebuild an entry from a stored row. Bounds were checked when it was written.
    pub fn restore(
        id: EntryId,
        leaderboard_id: LeaderboardId,
        player_id: PlayerId,
        score: Score,
    ) -> Self {
        Self {
            id,
            leaderboard_id,
            player_id,
            score,
        }
    }

    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn leaderboard_id(&self) -> LeaderboardId {
        self.leaderboard_id
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Replace the score. The leaderboard must be the one that owns this entry.
    pub fn set_score(&mut self, leaderboard: &Leaderboard, score: Score) -> Result<(), ValidationError> {
        if leaderboard.id() != self.leaderboard_id {
            return Err(ValidationError::LeaderboardMismatch {
                expected: self.leaderboard_id,
                actual: leaderboard.id(),
            });
        }
        leaderboard.check_score(score)?;
        self.score = score;
        Ok(())
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            id: self.id,
            leaderboard_id: self.leaderboard_id,
            player_id: self.player_id,
            score: self.score,
        }
    }
}

/// Rank-free projection of an entry. This is what gets cached; rank
/// depends on the whole leaderboard and is always computed at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub leaderboard_id: LeaderboardId,
    pub player_id: PlayerId,
    pub score: Score,
}

impl EntrySnapshot {
    pub fn to_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry::restore(self.id, self.leaderboard_id, self.player_id, self.score)
    }

    pub fn with_rank(self, rank: Rank) -> EntryView {
        EntryView {
            id: self.id,
            leaderboard_id: self.leaderboard_id,
            player_id: self.player_id,
            score: self.score,
            rank,
        }
    }
}

impl From<&LeaderboardEntry> for EntrySnapshot {
    fn from(entry: &LeaderboardEntry) -> Self {
        entry.snapshot()
    }
}

/// An entry together with its live rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: EntryId,
    pub leaderboard_id: LeaderboardId,
    pub player_id: PlayerId,
    pub score: Score,
    pub rank: Rank,
}
