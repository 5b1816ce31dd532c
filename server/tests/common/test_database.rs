use anyhow::{Context, Result};
use sqlx::{Executor, PgPool, postgres::PgPoolOptions};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::info;

use server::config::DatabaseConfig;
use server::db::postgres::run_migrations;

/// Manages test database creation and cleanup
pub struct TestDatabase {
    /// Name of the test database
    pub name: String,
    /// Pool connected to the test database
    pub pool: PgPool,
    /// Connection to the admin database for cleanup
    admin_pool: PgPool,
}

// Global counter for unique database names
static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

impl TestDatabase {
    /// Create a fresh, migrated database next to the one `DATABASE_URL` points at.
    pub async fn new(test_name: &str) -> Result<Self> {
        let counter = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_millis() as u64;
        let name = format!("test_{}_{}", timestamp, counter);

        info!("Creating test database: {} for test: {}", name, test_name);

        let admin_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let admin_pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&admin_url)
            .await
            .context("Failed to connect to admin database")?;

        let create_query = format!("CREATE DATABASE \"{}\"", name);
        admin_pool
            .execute(create_query.as_str())
            .await
            .context("Failed to create test database")?;

        let config = database_config(&admin_url, &name)?;
        run_migrations(&config).await?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url())
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            name,
            pool,
            admin_pool,
        })
    }

    /// Drop the test database
    pub async fn cleanup(self) -> Result<()> {
        info!("Cleaning up test database: {}", self.name);

        self.pool.close().await;

        let drop_query = format!("DROP DATABASE \"{}\" WITH (FORCE)", self.name);
        self.admin_pool
            .execute(drop_query.as_str())
            .await
            .context("Failed to drop test database")?;

        self.admin_pool.close().await;
        Ok(())
    }
}

/// Same server and credentials as `admin_url`, different database.
fn database_config(admin_url: &str, name: &str) -> Result<DatabaseConfig> {
    let url = url::Url::parse(admin_url)?;
    Ok(DatabaseConfig {
        host: url.host_str().unwrap_or("localhost").to_string(),
        port: url.port().unwrap_or(5432).to_string(),
        user: url.username().to_string(),
        pass: url.password().unwrap_or_default().to_string(),
        name: name.to_string(),
        max_connections: 5,
    })
}

/// Create a test database and automatically clean it up when the guard is dropped
pub struct TestDatabaseGuard {
    db: Option<TestDatabase>,
}

impl TestDatabaseGuard {
    pub async fn new(test_name: &str) -> Result<Self> {
        let db = TestDatabase::new(test_name).await?;
        Ok(Self { db: Some(db) })
    }

    pub fn pool(&self) -> PgPool {
        self.db.as_ref().expect("database already cleaned up").pool.clone()
    }

    pub async fn cleanup(mut self) -> Result<()> {
        match self.db.take() {
            Some(db) => db.cleanup().await,
            None => Ok(()),
        }
    }
}

impl Drop for TestDatabaseGuard {
    fn drop(&mut self) {
        if let Some(db) = self.db.take() {
            // Spawn a task to clean up the database
            tokio::spawn(async move {
                if let Err(e) = db.cleanup().await {
                    eprintln!("Failed to cleanup test database: {}", e);
                }
            });
        }
    }
}
