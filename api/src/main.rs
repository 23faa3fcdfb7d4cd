use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use tfa_api::{create_app, AppState};
use tfa_core::{
    InMemoryUserRepository, TokenPurgeListener, TwoFactorCollaborators, TwoFactorService,
    TwoFactorServiceConfig, UserRecord,
};
use tfa_shared::config::environment::LogFormat;
use tfa_shared::{AppConfig, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Invalid configuration")?;

    init_tracing(&config.logging);
    tracing::info!(
        environment = ?config.environment,
        bind = %config.server.bind_address(),
        "Starting second-factor login server"
    );

    let services = tfa_infra::initialize(&config)
        .await
        .context("Failed to initialize infrastructure")?;

    if let Some(users) = &services.memory_users {
        seed_demo_user(users).await?;
    }

    let mut service = TwoFactorService::new(
        TwoFactorCollaborators {
            credentials: services.credentials.clone(),
            users: services.users.clone(),
            tokens: services.tokens.clone(),
            gateway: services.gateway.clone(),
            guard: services.guard.clone(),
        },
        TwoFactorServiceConfig::from_config(&config.two_factor)?,
    );
    if let Some(throttle) = &services.throttle {
        service = service.with_throttle(throttle.clone());
    }
    if config.two_factor.delete_tokens_after_auth {
        service = service.with_listener(Arc::new(TokenPurgeListener::new(services.tokens.clone())));
    }

    let state = web::Data::new(
        AppState::new(
            Arc::new(service),
            services.sessions.clone(),
            config.session.clone(),
        )
        .with_database(services.database.clone()),
    );

    let mut server =
        HttpServer::new(move || create_app(state.clone()).wrap(TracingLogger::default()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(config.server.bind_address())
        .with_context(|| format!("Failed to bind {}", config.server.bind_address()))?
        .run()
        .await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Account for trying the flow against the in-memory backend
async fn seed_demo_user(users: &InMemoryUserRepository) -> anyhow::Result<()> {
    let (Ok(email), Ok(password), Ok(phone)) = (
        std::env::var("DEMO_USER_EMAIL"),
        std::env::var("DEMO_USER_PASSWORD"),
        std::env::var("DEMO_USER_PHONE"),
    ) else {
        return Ok(());
    };
    let country_code = std::env::var("DEMO_USER_COUNTRY_CODE").unwrap_or_else(|_| "+1".to_string());

    users
        .add_user(UserRecord::new(&email, &country_code, &phone), &password)
        .await?;
    tracing::info!(email = %email, "Seeded demo user");
    Ok(())
}
