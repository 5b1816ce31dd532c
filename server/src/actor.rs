use common::{LeaderboardEntry, PlayerId};

use crate::error::LeaderboardError;

/// Resolved caller identity, as supplied by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub player_id: PlayerId,
    pub is_admin: bool,
}

impl Actor {
    pub fn player(player_id: PlayerId) -> Self {
        Self { player_id, is_admin: false }
    }

    pub fn admin(player_id: PlayerId) -> Self {
        Self { player_id, is_admin: true }
    }

    pub fn owns(&self, entry: &LeaderboardEntry) -> bool {
        entry.player_id() == self.player_id
    }

    pub fn can_modify(&self, entry: &LeaderboardEntry) -> bool {
        self.is_admin || self.owns(entry)
    }
}

pub fn require(actor: Option<&Actor>) -> Result<&Actor, LeaderboardError> {
    actor.ok_or(LeaderboardError::Unauthorized)
}

pub fn require_admin(actor: Option<&Actor>) -> Result<&Actor, LeaderboardError> {
    let actor = require(actor)?;
    if !actor.is_admin {
        return Err(LeaderboardError::Forbidden);
    }
    Ok(actor)
}
