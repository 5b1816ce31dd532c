use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use uuid::Uuid;

use ::common::{Leaderboard, PlayerId};
use server::cache::{Cache, MemoryCache};
use server::db::{InMemoryStore, ScoreStore};
use server::names::{NameError, NameResolver};
use server::{Actor, EntryService, LeaderboardService};

/// In-memory cache that records deletions and can be switched off to
/// simulate an unreachable cache server.
#[derive(Default)]
pub struct SpyCache {
    inner: MemoryCache,
    deleted: Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl SpyCache {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn was_deleted(&self, key: &str) -> bool {
        self.deleted.lock().unwrap().iter().any(|k| k == key)
    }

    pub fn clear_log(&self) {
        self.deleted.lock().unwrap().clear();
    }

    pub async fn contains(&self, key: &str) -> bool {
        matches!(self.inner.get(key).await, Ok(Some(_)))
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for SpyCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.deleted.lock().unwrap().push(key.to_string());
        self.inner.delete(key).await
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<()> {
        self.check()?;
        self.inner.touch(key, ttl).await
    }
}

/// Name table that tests can extend after the services are built.
#[derive(Default)]
pub struct SharedNames {
    names: RwLock<HashMap<PlayerId, String>>,
}

impl SharedNames {
    pub fn insert(&self, player_id: PlayerId, name: &str) {
        self.names.write().unwrap().insert(player_id, name.to_string());
    }
}

#[async_trait]
impl NameResolver for SharedNames {
    async fn display_name(&self, player_id: PlayerId) -> Result<String, NameError> {
        self.names
            .read()
            .unwrap()
            .get(&player_id)
            .cloned()
            .ok_or(NameError::UnknownPlayer(player_id))
    }
}

/// Services wired over an in-memory store, a spy cache and a shared name table.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<SpyCache>,
    pub names: Arc<SharedNames>,
    pub entries: EntryService,
    pub leaderboards: LeaderboardService,
    pub admin: Actor,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(SpyCache::default());
        let names = Arc::new(SharedNames::default());

        let entries = EntryService::new(store.clone(), names.clone(), cache.clone());
        let leaderboards = LeaderboardService::new(store.clone(), cache.clone());

        Self {
            store,
            cache,
            names,
            entries,
            leaderboards,
            admin: Actor::admin(Uuid::new_v4()),
        }
    }

    /// A new non-admin player with a display name.
    pub fn player(&self, name: &str) -> Actor {
        let actor = Actor::player(Uuid::new_v4());
        self.names.insert(actor.player_id, name);
        actor
    }

    /// A new non-admin player the name resolver does not know.
    pub fn nameless_player(&self) -> Actor {
        Actor::player(Uuid::new_v4())
    }

    pub async fn leaderboard(&self, name: &str, num_of_top_scores: u32) -> Leaderboard {
        let leaderboard = Leaderboard::new(name, num_of_top_scores).unwrap();
        self.store.add_leaderboard(&leaderboard).await.unwrap()
    }

    pub async fn bounded_leaderboard(&self, name: &str, num_of_top_scores: u32, min: i64, max: i64) -> Leaderboard {
        let leaderboard = Leaderboard::new(name, num_of_top_scores)
            .unwrap()
            .with_bounds(min, max)
            .unwrap();
        self.store.add_leaderboard(&leaderboard).await.unwrap()
    }
}
