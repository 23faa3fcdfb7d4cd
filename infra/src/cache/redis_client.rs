//! Redis client with connection retry
//!
//! Holds one multiplexed connection shared by the session store and the
//! login throttle. Every key goes through [`RedisClient::key`] so deployments
//! can share a Redis instance.

use redis::{aio::MultiplexedConnection, Client};
use std::time::Duration;
use tfa_shared::CacheConfig;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

const RETRY_DELAY_MS: u64 = 100;
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis client with automatic connection retry
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect, retrying up to `config.max_retries` times with exponential backoff
    ///
    /// # Example
    /// ```no_run
    /// use tfa_infra::RedisClient;
    /// use tfa_shared::CacheConfig;
    ///
    /// async fn connect() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     Ok(RedisClient::new(CacheConfig::default()).await?)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::connect_with_retry(&client, config.max_retries.max(1)).await?;

        info!("Redis client created successfully");
        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        max_retries: u32,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = RETRY_DELAY_MS;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Connecting to Redis");

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries = max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Redis connection failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!(attempts = attempts, error = %e, "Giving up on Redis connection");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// A handle on the shared multiplexed connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Namespaced key, e.g. `tfa:session:<id>`
    pub fn key(&self, parts: &[&str]) -> String {
        self.config.key(parts)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// Hide credentials embedded in a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
