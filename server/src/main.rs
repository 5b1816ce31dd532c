use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use server::api::jwt::JwtManager;
use server::api::{AppState, run_api_server};
use server::cache::{Cache, MemoryCache};
use server::config::ServerConfig;
use server::db::{PostgresStore, ScoreStore, postgres};
use server::names::{CachedNames, NameResolver};
use server::redis_cache::RedisCache;
use server::{EntryService, LeaderboardService, redis_utils, seed};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if exists
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    // Database setup
    postgres::run_migrations(&config.database).await?;
    let store = Arc::new(PostgresStore::connect(&config.database).await?);

    if let Some(path) = &config.seed_file {
        seed::seed_players(&store, path)
            .await
            .context("Failed to seed players")?;
    }

    let cache: Arc<dyn Cache> = match &config.redis_url {
        Some(url) => {
            let redis = redis_utils::connect(url).await?;
            info!("Using Redis cache");
            Arc::new(RedisCache::new(redis))
        }
        None => {
            warn!("LEADERBOARD_REDIS_URL not set, caching in process memory");
            Arc::new(MemoryCache::new())
        }
    };

    let names: Arc<dyn NameResolver> = Arc::new(CachedNames::new(cache.clone(), store.clone()));
    let store: Arc<dyn ScoreStore> = store;

    let state = AppState {
        entries: EntryService::new(store.clone(), names, cache.clone()),
        leaderboards: LeaderboardService::new(store, cache),
    };
    let jwt_manager = Arc::new(JwtManager::new(&config.jwt_secret));

    info!("Server started. Waiting for shutdown signal (Ctrl+C)...");
    run_api_server(&config.http_addr(), state, jwt_manager, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Received shutdown signal. Shutting down gracefully...");
    })
    .await?;

    info!("Server shut down successfully");
    Ok(())
}
