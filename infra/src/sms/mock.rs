//! Mock delivery gateway
//!
//! Logs every code instead of sending it and keeps the messages in memory so
//! tests and local development can read them back.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use tfa_core::{DeliveryChannel, DeliveryGateway, MessageTemplate};
use tfa_shared::phone::{is_valid_international_phone, mask_phone_number};

/// A message the mock gateway accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: DeliveryChannel,
    pub destination: String,
    pub code: String,
    pub text: String,
}

#[derive(Clone, Default)]
pub struct MockDeliveryGateway {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
    messages: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockDeliveryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again)
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Everything sent so far, oldest first
    pub fn messages(&self) -> Vec<SentMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Most recent code sent to `destination`
    pub fn last_code_for(&self, destination: &str) -> Option<String> {
        self.messages()
            .into_iter()
            .rev()
            .find(|message| message.destination == destination)
            .map(|message| message.code)
    }

    fn deliver(&self, channel: DeliveryChannel, code: &str, destination: &str, text: String) -> bool {
        let masked = mask_phone_number(destination);

        if !is_valid_international_phone(destination) {
            warn!(
                provider = "mock",
                channel = %channel,
                phone = %masked,
                "Rejected destination that is not in E.164 format"
            );
            return false;
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(provider = "mock", channel = %channel, phone = %masked, "Simulated delivery failure");
            return false;
        }

        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            target: "sms_service",
            provider = "mock",
            channel = %channel,
            phone = %masked,
            message_number = count,
            text = %text,
            "Mock verification code delivered"
        );

        if let Ok(mut messages) = self.messages.lock() {
            messages.push(SentMessage {
                channel,
                destination: destination.to_string(),
                code: code.to_string(),
                text,
            });
        }
        true
    }
}

#[async_trait]
impl DeliveryGateway for MockDeliveryGateway {
    async fn send_via_sms(&self, code: &str, destination: &str, template: &MessageTemplate) -> bool {
        self.deliver(DeliveryChannel::Sms, code, destination, template.render(code))
    }

    async fn send_via_call(&self, code: &str, destination: &str, template: &MessageTemplate) -> bool {
        let text = self.spoken_text(code, template);
        self.deliver(DeliveryChannel::Call, code, destination, text)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
