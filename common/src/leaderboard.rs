use serde::{Deserialize, Serialize};

use crate::{LeaderboardId, Score, ValidationError};

pub const DEFAULT_MIN_SCORE: Score = 0;
pub const DEFAULT_MAX_SCORE: Score = Score::MAX;
/// Largest top size a store can hold (signed 32-bit column).
pub const MAX_TOP_SCORES: u32 = i32::MAX as u32;

/// A named scoring pool. Scores submitted to it must fall inside
/// `[min_score, max_score]`, and the `num_of_top_scores` best entries
/// form its cached "top" view.
///
/// Fields are private so every change goes through a validating setter;
/// deserialization runs the same checks via [`LeaderboardRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LeaderboardRecord", into = "LeaderboardRecord")]
pub struct Leaderboard {
    id: LeaderboardId,
    name: String,
    min_score: Score,
    max_score: Score,
    num_of_top_scores: u32,
}

/// Wire shape of a leaderboard, used for (de)serialization only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRecord {
    #[serde(default)]
    pub id: LeaderboardId,
    pub name: String,
    #[serde(default = "default_min_score")]
    pub min_score: Score,
    #[serde(default = "default_max_score")]
    pub max_score: Score,
    pub num_of_top_scores: u32,
}

fn default_min_score() -> Score {
    DEFAULT_MIN_SCORE
}

fn default_max_score() -> Score {
    DEFAULT_MAX_SCORE
}

impl Leaderboard {
    /// Create an unsaved leaderboard (id `0`) with the default score bounds.
    pub fn new(name: impl Into<String>, num_of_top_scores: u32) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        validate_num_of_top_scores(num_of_top_scores)?;

        Ok(Self {
            id: 0,
            name,
            min_score: DEFAULT_MIN_SCORE,
            max_score: DEFAULT_MAX_SCORE,
            num_of_top_scores,
        })
    }

    /// Rebuild a leaderboard from stored fields, re-checking every invariant.
    pub fn restore(
        id: LeaderboardId,
        name: impl Into<String>,
        min_score: Score,
        max_score: Score,
        num_of_top_scores: u32,
    ) -> Result<Self, ValidationError> {
        Self::new(name, num_of_top_scores)?
            .with_id(id)
            .with_bounds(min_score, max_score)
    }

    pub fn with_id(mut self, id: LeaderboardId) -> Self {
        self.id = id;
        self
    }

    pub fn with_bounds(mut self, min_score: Score, max_score: Score) -> Result<Self, ValidationError> {
        self.set_bounds(min_score, max_score)?;
        Ok(self)
    }

    pub fn id(&self) -> LeaderboardId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_score(&self) -> Score {
        self.min_score
    }

    pub fn max_score(&self) -> Score {
        self.max_score
    }

    pub fn num_of_top_scores(&self) -> u32 {
        self.num_of_top_scores
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Checked against the current max, so moving both bounds past each
    /// other needs [`Leaderboard::set_bounds`].
    pub fn set_min_score(&mut self, min_score: Score) -> Result<(), ValidationError> {
        if min_score >= self.max_score {
            return Err(ValidationError::InvalidBounds {
                min: min_score,
                max: self.max_score,
            });
        }
        self.min_score = min_score;
        Ok(())
    }

    pub fn set_max_score(&mut self, max_score: Score) -> Result<(), ValidationError> {
        if max_score <= self.min_score {
            return Err(ValidationError::InvalidBounds {
                min: self.min_score,
                max: max_score,
            });
        }
        self.max_score = max_score;
        Ok(())
    }

    pub fn set_bounds(&mut self, min_score: Score, max_score: Score) -> Result<(), ValidationError> {
        if min_score >= max_score {
            return Err(ValidationError::InvalidBounds {
                min: min_score,
                max: max_score,
            });
        }
        self.min_score = min_score;
        self.max_score = max_score;
        Ok(())
    }

    pub fn set_num_of_top_scores(&mut self, num_of_top_scores: u32) -> Result<(), ValidationError> {
        validate_num_of_top_scores(num_of_top_scores)?;
        self.num_of_top_scores = num_of_top_scores;
        Ok(())
    }

    pub fn check_score(&self, score: Score) -> Result<(), ValidationError> {
        if score < self.min_score || score > self.max_score {
            return Err(ValidationError::ScoreOutOfRange {
                score,
                min: self.min_score,
                max: self.max_score,
            });
        }
        Ok(())
    }

    /// Whether an entry at `rank` belongs to the cached top view.
    pub fn is_top_rank(&self, rank: u64) -> bool {
        rank <= u64::from(self.num_of_top_scores)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

fn validate_num_of_top_scores(num_of_top_scores: u32) -> Result<(), ValidationError> {
    if !(1..=MAX_TOP_SCORES).contains(&num_of_top_scores) {
        return Err(ValidationError::InvalidTopSize(num_of_top_scores));
    }
    Ok(())
}

impl TryFrom<LeaderboardRecord> for Leaderboard {
    type Error = ValidationError;

    fn try_from(record: LeaderboardRecord) -> Result<Self, Self::Error> {
        Self::restore(
            record.id,
            record.name,
            record.min_score,
            record.max_score,
            record.num_of_top_scores,
        )
    }
}

impl From<Leaderboard> for LeaderboardRecord {
    fn from(leaderboard: Leaderboard) -> Self {
        Self {
            id: leaderboard.id,
            name: leaderboard.name,
            min_score: leaderboard.min_score,
            max_score: leaderboard.max_score,
            num_of_top_scores: leaderboard.num_of_top_scores,
        }
    }
}
