//! SMS module - verification code delivery
//!
//! - [`MockDeliveryGateway`]: logs and records codes, for development and tests
//! - `TwilioGateway`: Twilio programmable messaging and voice (`twilio-sms` feature)
//! - [`twiml`]: the TwiML document Twilio fetches when a voice call connects

pub mod mock;
#[cfg(feature = "twilio-sms")]
pub mod twilio;
pub mod twiml;

use std::sync::Arc;

use tfa_core::DeliveryGateway;
use tfa_shared::{SmsConfig, SmsProvider};

use crate::InfrastructureError;

pub use mock::{MockDeliveryGateway, SentMessage};
#[cfg(feature = "twilio-sms")]
pub use twilio::TwilioGateway;

/// Build the gateway selected by `config.provider`
///
/// `public_url` is the externally reachable base URL of this server; voice
/// calls point Twilio back at it to fetch the text to read out.
pub fn create_delivery_gateway(
    config: &SmsConfig,
    public_url: &str,
) -> Result<Arc<dyn DeliveryGateway>, InfrastructureError> {
    match config.provider {
        SmsProvider::Mock => {
            tracing::info!("Using mock delivery gateway");
            Ok(Arc::new(MockDeliveryGateway::new()))
        }
        #[cfg(feature = "twilio-sms")]
        SmsProvider::Twilio => {
            config.validate().map_err(InfrastructureError::Config)?;
            tracing::info!("Using Twilio delivery gateway");
            Ok(Arc::new(TwilioGateway::new(config, public_url)?))
        }
        #[cfg(not(feature = "twilio-sms"))]
        SmsProvider::Twilio => {
            let _ = public_url;
            Err(InfrastructureError::Config(
                "SMS_PROVIDER=twilio requires the `twilio-sms` feature".to_string(),
            ))
        }
    }
}
