use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::cache::Cache;

/// [`Cache`] backed by a shared Redis instance.
#[derive(Clone)]
pub struct RedisCache {
    redis: ConnectionManager,
}

impl RedisCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.redis
            .clone()
            .get::<_, Option<Vec<u8>>>(key)
            .await
            .with_context(|| format!("Failed to get {} from Redis", key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.redis
            .clone()
            .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .with_context(|| format!("Failed to put {} to Redis with expiration", key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.redis
            .clone()
            .del::<_, ()>(key)
            .await
            .with_context(|| format!("Failed to remove {} from Redis", key))
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<()> {
        self.redis
            .clone()
            .expire::<_, ()>(key, ttl.as_secs().max(1) as i64)
            .await
            .with_context(|| format!("Failed to touch {} expiration", key))
    }
}
