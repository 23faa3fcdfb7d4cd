//! Verification token entity for the second login step.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use tfa_shared::phone::mask_phone_number;
use uuid::Uuid;

use crate::domain::value_objects::{DeliveryChannel, DeliveryOutcome, MessageTemplate};
use crate::errors::DomainResult;
use crate::repositories::{TokenRepository, UserLookup};
use crate::services::code_generator;
use crate::services::delivery::DeliveryGateway;

/// Minutes a token stays valid after creation
pub const EXPIRATION_MINUTES: i64 = 15;

/// One-time code bound to a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Unique identifier for the token
    pub id: Uuid,

    /// Fixed-width numeric code
    pub code: String,

    /// Owner of the token; never changes
    pub user_id: Uuid,

    /// Set once, on successful verification
    pub used: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Creates an unsaved token with a fresh random code of `code_length` digits
    pub fn new(user_id: Uuid, code_length: usize) -> DomainResult<Self> {
        let code = code_generator::generate(code_length)?;
        Ok(Self::with_code(user_id, code))
    }

    /// Creates an unsaved token with a known code
    pub fn with_code(user_id: Uuid, code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            user_id,
            used: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generates and persists a new token
    ///
    /// # Errors
    ///
    /// * `DomainError::Configuration` - `code_length` outside 1..=18
    /// * `DomainError::Persistence` - the store rejected the write
    pub async fn create(
        tokens: &dyn TokenRepository,
        user_id: Uuid,
        code_length: usize,
    ) -> DomainResult<Self> {
        let token = Self::new(user_id, code_length)?;
        tokens.create(&token).await?;

        tracing::info!(
            token_id = %token.id,
            user_id = %user_id,
            event = "token_created",
            "Created verification token"
        );

        Ok(token)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::minutes(EXPIRATION_MINUTES)
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Strictly more than the expiration window has elapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::minutes(EXPIRATION_MINUTES)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let used = self.is_used();
        let expired = self.is_expired_at(now);
        !used && !expired
    }

    /// Flip `used` to true; returns whether this call made the transition
    pub fn mark_used(&mut self) -> bool {
        if self.used {
            return false;
        }
        self.used = true;
        self.updated_at = Utc::now();
        true
    }

    /// Exact comparison against a submitted code in constant time
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }

    /// Send the code by SMS to the owner's registered phone
    pub async fn send_code(
        &self,
        users: &dyn UserLookup,
        gateway: &dyn DeliveryGateway,
        template: &MessageTemplate,
    ) -> DomainResult<DeliveryOutcome> {
        self.send_code_via(DeliveryChannel::Sms, users, gateway, template)
            .await
    }

    /// Send the code over `channel`
    ///
    /// Does not retry and does not change the token. Gateway failures are
    /// reported as `DeliveryOutcome::Failed`; only a failing user lookup
    /// surfaces as `Err`.
    pub async fn send_code_via(
        &self,
        channel: DeliveryChannel,
        users: &dyn UserLookup,
        gateway: &dyn DeliveryGateway,
        template: &MessageTemplate,
    ) -> DomainResult<DeliveryOutcome> {
        let Some(user) = users.find_user(self.user_id).await? else {
            tracing::warn!(
                token_id = %self.id,
                user_id = %self.user_id,
                event = "token_user_missing",
                "Token owner not found, code not sent"
            );
            return Ok(DeliveryOutcome::UserNotFound);
        };

        if !user.has_second_factor_enabled() {
            tracing::warn!(
                user_id = %user.id,
                event = "second_factor_disabled",
                "User has two-factor authentication disabled"
            );
            return Ok(DeliveryOutcome::SecondFactorDisabled);
        }

        let destination = user.delivery_destination();
        let sent = match channel {
            DeliveryChannel::Sms => gateway.send_via_sms(&self.code, &destination, template).await,
            DeliveryChannel::Call => {
                gateway.send_via_call(&self.code, &destination, template).await
            }
        };

        if sent {
            tracing::info!(
                token_id = %self.id,
                phone = %mask_phone_number(&destination),
                channel = %channel,
                provider = gateway.provider_name(),
                event = "code_sent",
                "Verification code sent"
            );
            Ok(DeliveryOutcome::Sent)
        } else {
            tracing::error!(
                token_id = %self.id,
                phone = %mask_phone_number(&destination),
                channel = %channel,
                provider = gateway.provider_name(),
                event = "code_send_failed",
                "Verification code could not be sent"
            );
            Ok(DeliveryOutcome::Failed)
        }
    }
}
