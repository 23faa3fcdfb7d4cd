//! State carried between the password step and the code step.

use serde_json::Value;
use uuid::Uuid;

use crate::domain::session::Session;

pub const TOKEN_ID_KEY: &str = "token_id";
pub const USER_ID_KEY: &str = "user_id";
pub const REMEMBER_KEY: &str = "remember";
pub const LOGIN_IDENTIFIER_KEY: &str = "login_identifier";

/// Binding between an accepted password and an outstanding token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLogin {
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub remember: bool,
}

impl PendingLogin {
    pub fn new(token_id: Uuid, user_id: Uuid, remember: bool) -> Self {
        Self {
            token_id,
            user_id,
            remember,
        }
    }

    /// Both ids are present, whether or not they parse
    pub fn is_present(session: &dyn Session) -> bool {
        session.has(&[TOKEN_ID_KEY, USER_ID_KEY])
    }

    /// Read the pending state; `None` if absent or malformed
    pub fn load(session: &dyn Session) -> Option<Self> {
        let token_id = read_uuid(session, TOKEN_ID_KEY)?;
        let user_id = read_uuid(session, USER_ID_KEY)?;
        let remember = session
            .get(REMEMBER_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Some(Self::new(token_id, user_id, remember))
    }

    pub fn store(&self, session: &mut dyn Session) {
        session.set(TOKEN_ID_KEY, Value::String(self.token_id.to_string()));
        session.set(USER_ID_KEY, Value::String(self.user_id.to_string()));
        session.set(REMEMBER_KEY, Value::Bool(self.remember));
    }

    /// Identifier the password step was throttled under
    pub fn store_identifier(session: &mut dyn Session, identifier: &str) {
        session.set(LOGIN_IDENTIFIER_KEY, Value::String(identifier.to_string()));
    }

    pub fn identifier(session: &dyn Session) -> Option<String> {
        session
            .get(LOGIN_IDENTIFIER_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn clear(session: &mut dyn Session) {
        session.forget(&[TOKEN_ID_KEY, USER_ID_KEY, REMEMBER_KEY, LOGIN_IDENTIFIER_KEY]);
    }
}

fn read_uuid(session: &dyn Session, key: &str) -> Option<Uuid> {
    session
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}
