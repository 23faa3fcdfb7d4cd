//! Mock collaborators for testing the second-factor flow

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::{UserRecord, VerificationToken};
use crate::domain::events::AuthenticatedEvent;
use crate::domain::value_objects::{DeliveryChannel, MessageTemplate};
use crate::errors::DomainError;
use crate::repositories::{InMemoryTokenRepository, TokenRepository, UserLookup};
use crate::services::delivery::DeliveryGateway;
use crate::services::listeners::AuthenticatedListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: DeliveryChannel,
    pub code: String,
    pub destination: String,
    pub text: String,
}

// Gateway recording every message, optionally failing
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<SentMessage>>,
    pub should_fail: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.should_fail.store(true, Ordering::SeqCst);
        gateway
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|m| m.code.clone())
    }

    fn record(&self, channel: DeliveryChannel, code: &str, destination: &str, text: String) -> bool {
        if self.should_fail.load(Ordering::SeqCst) {
            return false;
        }
        self.sent.lock().unwrap().push(SentMessage {
            channel,
            code: code.to_string(),
            destination: destination.to_string(),
            text,
        });
        true
    }
}

#[async_trait]
impl DeliveryGateway for RecordingGateway {
    async fn send_via_sms(&self, code: &str, destination: &str, template: &MessageTemplate) -> bool {
        self.record(DeliveryChannel::Sms, code, destination, template.render(code))
    }

    async fn send_via_call(
        &self,
        code: &str,
        destination: &str,
        template: &MessageTemplate,
    ) -> bool {
        let text = self.spoken_text(code, template);
        self.record(DeliveryChannel::Call, code, destination, text)
    }

    fn provider_name(&self) -> &str {
        "recording"
    }
}

// Listener remembering which users authenticated
#[derive(Default)]
pub struct RecordingListener {
    pub users: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl AuthenticatedListener for RecordingListener {
    async fn handle(&self, event: &AuthenticatedEvent) {
        self.users.lock().unwrap().push(event.user_id);
    }
}

// Token store whose writes always fail
#[derive(Default)]
pub struct FailingTokenRepository {
    inner: InMemoryTokenRepository,
}

#[async_trait]
impl TokenRepository for FailingTokenRepository {
    async fn create(&self, _token: &VerificationToken) -> Result<(), DomainError> {
        Err(DomainError::persistence("connection reset"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationToken>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<VerificationToken>, DomainError> {
        self.inner.find_by_user_id(user_id).await
    }

    async fn update(&self, _token: &VerificationToken) -> Result<(), DomainError> {
        Err(DomainError::persistence("connection reset"))
    }

    async fn mark_used(&self, _id: Uuid) -> Result<bool, DomainError> {
        Err(DomainError::persistence("connection reset"))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete_by_id(id).await
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.inner.delete_all_for_user(user_id).await
    }
}

// User store that is unreachable for lookups
pub struct FailingUserLookup;

#[async_trait]
impl UserLookup for FailingUserLookup {
    async fn find_user(&self, _id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        Err(DomainError::persistence("connection reset"))
    }
}
