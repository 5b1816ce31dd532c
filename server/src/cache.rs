use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Key-value store with per-key expiration. Nothing here is authoritative:
/// callers must treat any failure as a miss.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;

    /// Push the expiration of an existing key forward. No-op for missing keys.
    async fn touch(&self, key: &str, ttl: Duration) -> Result<()>;
}

/// JSON view over a [`Cache`] that never fails: read errors and undecodable
/// values are misses, write and delete errors are logged and dropped.
#[derive(Clone)]
pub struct BestEffortCache {
    inner: Arc<dyn Cache>,
}

impl BestEffortCache {
    pub fn new(inner: Arc<dyn Cache>) -> Self {
        Self { inner }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.inner.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, "Cache read failed, treating as miss: {:#}", e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "Dropping undecodable cache value: {}", e);
                self.invalidate(key).await;
                None
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, "Failed to serialize cache value: {}", e);
                return;
            }
        };

        if let Err(e) = self.inner.set(key, bytes, ttl).await {
            warn!(key, "Cache write failed: {:#}", e);
        }
    }

    pub async fn invalidate(&self, key: &str) {
        match self.inner.delete(key).await {
            Ok(()) => debug!(key, "Invalidated cache key"),
            Err(e) => warn!(key, "Cache delete failed: {:#}", e),
        }
    }
}

struct Slot {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process cache used when no Redis URL is configured, and in tests.
#[derive(Default)]
pub struct MemoryCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.expires_at > now)
            .count()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let slots = self.slots.read().await;
            match slots.get(key) {
                Some(slot) if slot.expires_at > now => return Ok(Some(slot.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it so the map doesn't grow with dead keys.
        let mut slots = self.slots.write().await;
        if slots.get(key).is_some_and(|slot| slot.expires_at <= now) {
            slots.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let slot = Slot {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.slots.write().await.insert(key.to_string(), slot);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.slots.write().await.remove(key);
        Ok(())
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        if let Some(slot) = self.slots.write().await.get_mut(key) {
            if slot.expires_at > now {
                slot.expires_at = now + ttl;
            }
        }
        Ok(())
    }
}
