//! TwiML for voice delivery
//!
//! When a verification call connects Twilio fetches
//! `<public_url>/tfa/services/twilio/say/<text>` and reads out the `<Say>` body
//! returned here.

/// Path prefix of the voice callback route
pub const SAY_ROUTE_PREFIX: &str = "tfa/services/twilio/say";

/// `<Response><Say>text</Say></Response>`
pub fn say_response(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Say>{}</Say></Response>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
