//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborator traits defined in `tfa_core`:
//!
//! - **Database**: MySQL token store and user directory using SQLx
//! - **Cache**: Redis client, session store
//! - **Services**: Redis-backed login throttle
//! - **SMS**: Twilio SMS / voice gateway, TwiML rendering, mock gateway
//!
//! ## Features
//!
//! - `twilio-sms`: Enable the Twilio gateway (default)

use std::sync::Arc;

use tfa_core::{
    AuthGuard, CredentialVerifier, DeliveryGateway, DomainError, InMemorySessionStore, InMemoryThrottle,
    InMemoryTokenRepository, InMemoryUserRepository, SessionAuthGuard, SessionStore,
    ThrottleGuard, TokenRepository, UserLookup,
};
use tfa_shared::{AppConfig, SmsProvider, StorageBackend};

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis client and session storage
pub mod cache;

/// Services module - Infrastructure service implementations
pub mod services;

/// SMS module - Delivery gateways
pub mod sms;

pub use cache::{RedisClient, RedisSessionStore};
pub use database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};
pub use services::RedisThrottle;
pub use sms::{create_delivery_gateway, MockDeliveryGateway};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS / voice delivery error
    #[error("SMS service error: {0}")]
    Sms(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Config(message) => DomainError::Configuration { message },
            other => DomainError::Persistence {
                message: other.to_string(),
            },
        }
    }
}

/// Infrastructure service container
///
/// Every collaborator `TwoFactorService` and the HTTP layer need, wired for
/// the configured storage backend and delivery provider.
#[derive(Clone)]
pub struct InfrastructureServices {
    pub credentials: Arc<dyn CredentialVerifier>,
    pub users: Arc<dyn UserLookup>,
    pub tokens: Arc<dyn TokenRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub throttle: Option<Arc<dyn ThrottleGuard>>,
    pub gateway: Arc<dyn DeliveryGateway>,
    pub guard: Arc<dyn AuthGuard>,
    /// Present when the MySQL backend is selected
    pub database: Option<DatabasePool>,
    /// Present when the in-memory backend is selected, for seeding accounts
    pub memory_users: Option<Arc<InMemoryUserRepository>>,
}

impl InfrastructureServices {
    /// In-process stores; used for development and tests
    pub fn in_memory(
        users: Arc<InMemoryUserRepository>,
        gateway: Arc<dyn DeliveryGateway>,
        throttle: Option<Arc<dyn ThrottleGuard>>,
    ) -> Self {
        Self {
            credentials: users.clone(),
            users: users.clone(),
            tokens: Arc::new(InMemoryTokenRepository::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            throttle,
            gateway,
            guard: Arc::new(SessionAuthGuard),
            database: None,
            memory_users: Some(users),
        }
    }
}

/// Initialize infrastructure services
///
/// This function sets up, according to `config`:
/// - MySQL pool and migrations, or in-memory stores
/// - Redis sessions and throttling (MySQL backend only)
/// - The delivery gateway
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        storage = ?config.storage,
        sms_provider = ?config.sms.provider,
        "Initializing infrastructure services..."
    );

    let gateway = create_delivery_gateway(&config.sms, &config.server.public_url)?;

    let services = match config.storage {
        StorageBackend::Memory => {
            let throttle = config.throttle.enabled.then(|| {
                Arc::new(InMemoryThrottle::from_config(&config.throttle)) as Arc<dyn ThrottleGuard>
            });
            InfrastructureServices::in_memory(
                Arc::new(InMemoryUserRepository::new()),
                gateway,
                throttle,
            )
        }
        StorageBackend::Mysql => {
            let database = DatabasePool::new(config.database.clone()).await?;
            if config.database.run_migrations {
                database.run_migrations().await?;
            }

            let redis = Arc::new(RedisClient::new(config.cache.clone()).await?);
            let users = Arc::new(MySqlUserRepository::new(database.get_pool().clone()));
            let throttle = config.throttle.enabled.then(|| {
                Arc::new(RedisThrottle::new(redis.clone(), config.throttle.clone()))
                    as Arc<dyn ThrottleGuard>
            });

            InfrastructureServices {
                credentials: users.clone(),
                users,
                tokens: Arc::new(MySqlTokenRepository::new(database.get_pool().clone())),
                sessions: Arc::new(RedisSessionStore::new(redis)),
                throttle,
                gateway,
                guard: Arc::new(SessionAuthGuard),
                database: Some(database),
                memory_users: None,
            }
        }
    };

    if config.sms.provider == SmsProvider::Mock && config.environment.is_production() {
        tracing::warn!("Mock delivery gateway active in production; codes are only logged");
    }

    tracing::info!("Infrastructure services initialized successfully");
    Ok(services)
}
