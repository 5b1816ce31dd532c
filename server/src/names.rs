use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use common::PlayerId;

use crate::cache::Cache;
use crate::cache_keys::{CacheKeys, PLAYER_NAME_TTL};

#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Maps a player to the display name used for tie-breaking.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn display_name(&self, player_id: PlayerId) -> Result<String, NameError>;
}

/// Fixed name table.
#[derive(Debug, Clone, Default)]
pub struct FixedNames {
    names: HashMap<PlayerId, String>,
}

impl FixedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, player_id: PlayerId, name: impl Into<String>) -> Self {
        self.insert(player_id, name);
        self
    }

    pub fn insert(&mut self, player_id: PlayerId, name: impl Into<String>) {
        self.names.insert(player_id, name.into());
    }
}

impl FromIterator<(PlayerId, String)> for FixedNames {
    fn from_iter<I: IntoIterator<Item = (PlayerId, String)>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

#[async_trait]
impl NameResolver for FixedNames {
    async fn display_name(&self, player_id: PlayerId) -> Result<String, NameError> {
        self.names
            .get(&player_id)
            .cloned()
            .ok_or(NameError::UnknownPlayer(player_id))
    }
}

/// Read-through name cache in front of another resolver.
///
/// Hits slide the expiration forward. Cache trouble falls through to the
/// inner resolver; unknown players are never cached.
#[derive(Clone)]
pub struct CachedNames {
    cache: Arc<dyn Cache>,
    inner: Arc<dyn NameResolver>,
}

impl CachedNames {
    pub fn new(cache: Arc<dyn Cache>, inner: Arc<dyn NameResolver>) -> Self {
        Self { cache, inner }
    }

    async fn get_from_cache(&self, player_id: PlayerId) -> Option<String> {
        let key = CacheKeys::player_name(player_id);
        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(name) => {
                    if let Err(e) = self.cache.touch(&key, PLAYER_NAME_TTL).await {
                        warn!(%player_id, "Failed to touch cached player name: {:#}", e);
                    }
                    Some(name)
                }
                Err(_) => {
                    warn!(%player_id, "Cached player name is not valid UTF-8, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(%player_id, "Failed to read player name from cache: {:#}", e);
                None
            }
        }
    }

    async fn put_to_cache(&self, player_id: PlayerId, name: &str) {
        let key = CacheKeys::player_name(player_id);
        if let Err(e) = self.cache.set(&key, name.as_bytes().to_vec(), PLAYER_NAME_TTL).await {
            warn!(%player_id, "Failed to cache player name: {:#}", e);
        }
    }

    pub async fn forget(&self, player_id: PlayerId) {
        if let Err(e) = self.cache.delete(&CacheKeys::player_name(player_id)).await {
            warn!(%player_id, "Failed to remove player name from cache: {:#}", e);
        }
    }
}

#[async_trait]
impl NameResolver for CachedNames {
    async fn display_name(&self, player_id: PlayerId) -> Result<String, NameError> {
        if let Some(name) = self.get_from_cache(player_id).await {
            return Ok(name);
        }

        let name = self.inner.display_name(player_id).await?;
        self.put_to_cache(player_id, &name).await;
        Ok(name)
    }
}
