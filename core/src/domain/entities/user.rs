//! The slice of a user account the second-factor flow reads.

use serde::{Deserialize, Serialize};
use tfa_shared::phone;
use uuid::Uuid;

/// User as seen by the verification flow
///
/// Owned by the primary account system; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login identifier
    pub email: String,

    /// Dialing prefix, e.g. `+1`
    pub country_code: String,

    /// Local part of the phone number
    pub phone: String,

    /// Whether the user opted into the second factor
    pub second_factor_enabled: bool,
}

impl UserRecord {
    pub fn new(
        email: impl Into<String>,
        country_code: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            country_code: country_code.into(),
            phone: phone.into(),
            second_factor_enabled: true,
        }
    }

    /// Where codes are delivered: country code followed by the phone number
    pub fn delivery_destination(&self) -> String {
        phone::join_destination(&self.country_code, &self.phone)
    }

    pub fn has_second_factor_enabled(&self) -> bool {
        self.second_factor_enabled
    }
}
