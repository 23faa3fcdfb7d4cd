//! Out-of-band code delivery

use async_trait::async_trait;

use crate::domain::value_objects::MessageTemplate;

/// Sends a code to a phone number by SMS or voice call
///
/// Provider failures are logged by the implementation and reported as
/// `false`; they never surface as errors.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Text `template` rendered with `code` to `destination`
    async fn send_via_sms(&self, code: &str, destination: &str, template: &MessageTemplate)
        -> bool;

    /// Place a call to `destination` that reads out `spoken_text`
    async fn send_via_call(
        &self,
        code: &str,
        destination: &str,
        template: &MessageTemplate,
    ) -> bool;

    /// Short provider name for logs
    fn provider_name(&self) -> &str;

    /// Text a voice provider reads out, with digits spoken one by one
    fn spoken_text(&self, code: &str, template: &MessageTemplate) -> String {
        template.render(&spell_out(code))
    }
}

/// `"4821"` becomes `"4 8 2 1"`
pub fn spell_out(code: &str) -> String {
    code.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}
