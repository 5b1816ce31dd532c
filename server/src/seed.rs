use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::db::PostgresStore;
use crate::db::models::Player;

/// Read a JSON array of `{"id": "...", "username": "..."}` players.
pub async fn load_players(path: &Path) -> Result<Vec<Player>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    parse_players(&raw).with_context(|| format!("Invalid seed file {}", path.display()))
}

pub fn parse_players(raw: &[u8]) -> Result<Vec<Player>> {
    let players: Vec<Player> = serde_json::from_slice(raw)?;
    if let Some(blank) = players.iter().find(|p| p.username.trim().is_empty()) {
        anyhow::bail!("Player {} has an empty username", blank.id);
    }
    Ok(players)
}

/// Upsert every player in the seed file, so their display names resolve.
pub async fn seed_players(store: &PostgresStore, path: &Path) -> Result<usize> {
    let players = load_players(path).await?;
    for player in &players {
        store.upsert_player(player).await?;
    }
    info!(count = players.len(), file = %path.display(), "Seeded players");
    Ok(players.len())
}
