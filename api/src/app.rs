//! Application state and factory
//!
//! This module handles the initialization of the application state
//! and provides the factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tfa_core::{SessionStore, TwoFactorService};
use tfa_infra::DatabasePool;
use tfa_shared::SessionConfig;

use crate::routes::{health, login, twilio, verification};

/// Application state shared by all handlers
pub struct AppState {
    pub service: Arc<TwoFactorService>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_config: SessionConfig,
    /// Checked by `/health` when the MySQL backend is active
    pub database: Option<DatabasePool>,
}

impl AppState {
    pub fn new(
        service: Arc<TwoFactorService>,
        sessions: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            service,
            sessions,
            session_config,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Option<DatabasePool>) -> Self {
        self.database = database;
        self
    }
}

/// Create and configure the application with all dependencies
///
/// The code form and resend routes are mounted under the configured
/// verification path. Request logging is added by the caller.
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = app_state.service.config();
    let login_path = config.login_path.clone();
    let verification_path = config.verification_path.clone();
    let resend_path = config.resend_path();

    App::new()
        .app_data(app_state)
        .route("/health", web::get().to(health::health_check))
        .service(web::resource(login_path).route(web::post().to(login::login)))
        .service(
            web::resource(verification_path)
                .route(web::get().to(verification::show_code_form))
                .route(web::post().to(verification::submit_code)),
        )
        .service(web::resource(resend_path).route(web::post().to(verification::resend_code)))
        // Twilio fetches call instructions with POST unless told otherwise
        .service(
            web::resource(format!("/{}/{{text}}", tfa_infra::sms::twiml::SAY_ROUTE_PREFIX))
                .route(web::get().to(twilio::say))
                .route(web::post().to(twilio::say)),
        )
        .default_service(web::route().to(|| async {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "message": "The requested resource was not found"
            }))
        }))
}
