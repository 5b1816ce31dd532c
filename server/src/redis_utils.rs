use anyhow::{Context, Result};
use redis::Client;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use std::time::Duration;

/// Creates a ConnectionManager with standardized configuration for the application.
///
/// Timeouts are kept short: the cache is an optimization, and a slow Redis
/// should turn into a miss quickly rather than stall a request.
pub async fn create_connection_manager(client: Client) -> Result<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_connection_timeout(Duration::from_secs(5))
        .set_response_timeout(Duration::from_secs(2))
        .set_number_of_retries(3)
        .set_exponent_base(2)
        .set_factor(100) // delays are base^n * 100ms
        .set_max_delay(5000);

    ConnectionManager::new_with_config(client, config)
        .await
        .context("Failed to create Redis connection manager with config")
}

pub async fn connect(url: &str) -> Result<ConnectionManager> {
    let client = Client::open(url).with_context(|| format!("Invalid Redis URL: {}", url))?;
    create_connection_manager(client).await
}
