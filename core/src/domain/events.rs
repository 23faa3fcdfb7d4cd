//! Domain events raised by the login flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user finished authenticating, with or without the second factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedEvent {
    pub user_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl AuthenticatedEvent {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            occurred_at: Utc::now(),
        }
    }
}
