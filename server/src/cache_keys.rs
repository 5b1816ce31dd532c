use std::time::Duration;

use common::{EntryId, LeaderboardId, PlayerId};

/// Entry snapshots change only when their own row does.
pub const ENTRY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Top lists aggregate many mutable rows, so they live shorter.
pub const TOP_TTL: Duration = Duration::from_secs(30 * 60);

/// Display names, refreshed on every hit.
pub const PLAYER_NAME_TTL: Duration = Duration::from_secs(60 * 60);

pub struct CacheKeys;

impl CacheKeys {
    // === Entry Snapshots ===

    /// Entry snapshot by entry id
    pub fn entry(entry_id: EntryId) -> String {
        format!("entry:{}", entry_id)
    }

    /// Entry snapshot by owning leaderboard and player.
    /// Denotes the same row as [`CacheKeys::entry`]; both are dropped together.
    pub fn entry_by_player(leaderboard_id: LeaderboardId, player_id: PlayerId) -> String {
        format!("entry:{}:{}", leaderboard_id, player_id)
    }

    /// Both snapshot keys of one entry
    pub fn entry_keys(
        entry_id: EntryId,
        leaderboard_id: LeaderboardId,
        player_id: PlayerId,
    ) -> [String; 2] {
        [
            Self::entry(entry_id),
            Self::entry_by_player(leaderboard_id, player_id),
        ]
    }

    // === Top-N ===

    /// Ordered top list of a leaderboard
    pub fn top(leaderboard_id: LeaderboardId) -> String {
        format!("top:{}", leaderboard_id)
    }

    // === Name Cache ===

    pub fn player_name(player_id: PlayerId) -> String {
        format!("player:{}:name", player_id)
    }
}
