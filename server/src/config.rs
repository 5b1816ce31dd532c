use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub pass: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: required("LEADERBOARD_DB_HOST")?,
            port: required("LEADERBOARD_DB_PORT")?,
            user: required("LEADERBOARD_DB_USER")?,
            pass: required("LEADERBOARD_DB_PASS")?,
            name: required("LEADERBOARD_DB_NAME")?,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        })
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.pass, self.host, self.port, self.name
        )
    }
}

/// Process configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database: DatabaseConfig,
    /// Without a Redis URL the service caches in process memory.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub http_port: u16,
    pub seed_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var("LEADERBOARD_HTTP_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("LEADERBOARD_HTTP_PORT is not a valid port: {}", port))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            redis_url: optional("LEADERBOARD_REDIS_URL"),
            jwt_secret: required("LEADERBOARD_JWT_SECRET")?,
            http_port,
            seed_file: optional("LEADERBOARD_SEED_FILE").map(PathBuf::from),
        })
    }

    pub fn http_addr(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set in environment or .env file", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
