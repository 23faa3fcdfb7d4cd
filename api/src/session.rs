//! Cookie-identified sessions
//!
//! The cookie carries only a random id; the data lives in the configured
//! `SessionStore`. Handlers load a [`RequestSession`], hand it to the flow
//! service as `&mut dyn Session`, then [`RequestSession::commit`] it, which
//! persists the data and attaches the cookie to the response.
//!
//! The id is rotated whenever the authenticated user changes during a
//! request, so a cookie issued before login never names a logged-in session.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponseBuilder};
use serde_json::Value;
use uuid::Uuid;

use tfa_core::domain::value_objects::pending_login::REMEMBER_KEY;
use tfa_core::services::auth_guard::remember_requested;
use tfa_core::{AuthGuard, Session, SessionAuthGuard, SessionData};
use tfa_shared::SessionConfig;

use crate::app::AppState;
use crate::handlers::error::ApiError;

pub struct RequestSession {
    id: String,
    data: SessionData,
    loaded_user: Option<Uuid>,
    retired_id: Option<String>,
}

impl RequestSession {
    /// Session named by the request cookie, or a fresh one
    pub async fn load(req: &HttpRequest, state: &AppState) -> Result<Self, ApiError> {
        if let Some(cookie) = req.cookie(&state.session_config.cookie_name) {
            let id = cookie.value().to_string();
            if let Some(data) = state.sessions.load(&id).await? {
                return Ok(Self::with_data(id, data));
            }
        }

        Ok(Self::with_data(Uuid::new_v4().to_string(), SessionData::new()))
    }

    fn with_data(id: String, data: SessionData) -> Self {
        Self {
            loaded_user: SessionAuthGuard.authenticated_user(&data),
            id,
            data,
            retired_id: None,
        }
    }

    /// Move the data to a fresh id; the old store entry is dropped on commit
    pub fn regenerate(&mut self) {
        let previous = std::mem::replace(&mut self.id, Uuid::new_v4().to_string());
        if self.retired_id.is_none() {
            self.retired_id = Some(previous);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    /// Lifetime in seconds; "remember me" extends it
    pub fn lifetime(&self, config: &SessionConfig) -> u64 {
        let pending_remember = self
            .data
            .get(REMEMBER_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if pending_remember || remember_requested(&self.data) {
            config.remember_ttl_seconds
        } else {
            config.ttl_seconds
        }
    }

    /// Persist the data and set the session cookie on `response`
    pub async fn commit(
        mut self,
        state: &AppState,
        response: &mut HttpResponseBuilder,
    ) -> Result<(), ApiError> {
        if SessionAuthGuard.authenticated_user(&self.data) != self.loaded_user {
            self.regenerate();
        }

        let config = &state.session_config;
        let ttl = self.lifetime(config);

        state.sessions.save(&self.id, &self.data, ttl).await?;
        if let Some(retired) = &self.retired_id {
            state.sessions.destroy(retired).await?;
            tracing::debug!(event = "session_regenerated", "Session id rotated");
        }
        response.cookie(session_cookie(config, self.id, ttl));
        Ok(())
    }
}

fn session_cookie(config: &SessionConfig, id: String, ttl: u64) -> Cookie<'static> {
    let same_site = match config.same_site.to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    };

    Cookie::build(config.cookie_name.clone(), id)
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site)
        .max_age(Duration::seconds(ttl.min(i64::MAX as u64) as i64))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RequestSession {
        RequestSession::with_data("abc".to_string(), SessionData::new())
    }

    #[test]
    fn test_regenerate_keeps_data_and_retires_first_id() {
        let mut session = session();
        session
            .data_mut()
            .set(REMEMBER_KEY, Value::Bool(true));

        session.regenerate();
        let rotated = session.id().to_string();
        session.regenerate();

        assert_ne!(rotated, "abc");
        assert_ne!(session.id(), rotated);
        assert_eq!(session.retired_id.as_deref(), Some("abc"));
        assert_eq!(session.data().get(REMEMBER_KEY), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_default_lifetime() {
        let config = SessionConfig::default();
        assert_eq!(session().lifetime(&config), config.ttl_seconds);
    }

    #[test]
    fn test_pending_remember_extends_lifetime() {
        let config = SessionConfig::default();
        let mut session = session();
        session.data_mut().set(REMEMBER_KEY, Value::Bool(true));
        assert_eq!(session.lifetime(&config), config.remember_ttl_seconds);
    }

    #[actix_rt::test]
    async fn test_authenticated_remember_extends_lifetime() {
        let config = SessionConfig::default();
        let mut session = session();
        SessionAuthGuard
            .login(session.data_mut(), Uuid::new_v4(), true)
            .await
            .unwrap();
        assert_eq!(session.lifetime(&config), config.remember_ttl_seconds);
    }

    #[test]
    fn test_cookie_attributes() {
        let config = SessionConfig {
            secure: true,
            same_site: "Strict".to_string(),
            ..Default::default()
        };
        let cookie = session_cookie(&config, "abc".to_string(), 60);

        assert_eq!(cookie.name(), "tfa_session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));
    }
}
