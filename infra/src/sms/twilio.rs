//! Twilio delivery gateway
//!
//! SMS goes through the Messages API. Voice calls are placed with a callback
//! URL on this server; Twilio fetches it when the call connects and reads out
//! the returned TwiML (see [`super::twiml`]).

use async_trait::async_trait;
use phonenumber::{Mode, PhoneNumber};
use reqwest::Url;
use tracing::{debug, error, info};
use twilio::{Client, OutboundCall, OutboundMessage};

use tfa_core::{DeliveryGateway, MessageTemplate};
use tfa_shared::phone::mask_phone_number;
use tfa_shared::SmsConfig;

use super::twiml::SAY_ROUTE_PREFIX;
use crate::InfrastructureError;

pub struct TwilioGateway {
    client: Client,
    from_number: String,
    public_url: Url,
}

impl TwilioGateway {
    pub fn new(config: &SmsConfig, public_url: &str) -> Result<Self, InfrastructureError> {
        let public_url = Url::parse(public_url).map_err(|e| {
            InfrastructureError::Config(format!("Invalid PUBLIC_URL '{}': {}", public_url, e))
        })?;
        if public_url.cannot_be_a_base() {
            return Err(InfrastructureError::Config(format!(
                "PUBLIC_URL '{}' cannot be used as a callback base",
                public_url
            )));
        }

        let from_number = validate_phone_number(&config.from_number)?;
        info!(
            from = %mask_phone_number(&from_number),
            "Twilio gateway initialized"
        );

        Ok(Self {
            client: Client::new(&config.account_sid, &config.auth_token),
            from_number,
            public_url,
        })
    }

    /// Callback URL that makes Twilio read `text` aloud
    pub fn say_url(&self, text: &str) -> String {
        let mut url = self.public_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(SAY_ROUTE_PREFIX.split('/'));
            segments.push(text);
        }
        url.to_string()
    }
}

/// Parse and format a destination as E.164
pub(crate) fn validate_phone_number(phone: &str) -> Result<String, InfrastructureError> {
    let parsed = phone.parse::<PhoneNumber>().map_err(|e| {
        InfrastructureError::Sms(format!(
            "Invalid phone number {}: {}",
            mask_phone_number(phone),
            e
        ))
    })?;
    let formatted = parsed.format().mode(Mode::E164).to_string();
    debug!(phone = %mask_phone_number(&formatted), "Validated phone number");
    Ok(formatted)
}

#[async_trait]
impl DeliveryGateway for TwilioGateway {
    async fn send_via_sms(&self, code: &str, destination: &str, template: &MessageTemplate) -> bool {
        let to = match validate_phone_number(destination) {
            Ok(to) => to,
            Err(e) => {
                error!(error = %e, "SMS not sent");
                return false;
            }
        };

        let body = template.render(code);
        let message = OutboundMessage::new(&self.from_number, &to, &body);

        match self.client.send_message(message).await {
            Ok(sent) => {
                info!(
                    provider = "twilio",
                    channel = "sms",
                    phone = %mask_phone_number(&to),
                    sid = %sent.sid,
                    "Verification code sent"
                );
                true
            }
            Err(e) => {
                error!(
                    provider = "twilio",
                    channel = "sms",
                    phone = %mask_phone_number(&to),
                    error = ?e,
                    "Twilio rejected SMS"
                );
                false
            }
        }
    }

    async fn send_via_call(&self, code: &str, destination: &str, template: &MessageTemplate) -> bool {
        let to = match validate_phone_number(destination) {
            Ok(to) => to,
            Err(e) => {
                error!(error = %e, "Call not placed");
                return false;
            }
        };

        let url = self.say_url(&self.spoken_text(code, template));
        let call = OutboundCall::new(&self.from_number, &to, &url);

        match self.client.make_call(call).await {
            Ok(placed) => {
                info!(
                    provider = "twilio",
                    channel = "call",
                    phone = %mask_phone_number(&to),
                    sid = %placed.sid,
                    "Verification call placed"
                );
                true
            }
            Err(e) => {
                error!(
                    provider = "twilio",
                    channel = "call",
                    phone = %mask_phone_number(&to),
                    error = ?e,
                    "Twilio rejected call"
                );
                false
            }
        }
    }

    fn provider_name(&self) -> &str {
        "twilio"
    }
}
