//! Per-request data the throttle guard keys on.

use serde::{Deserialize, Serialize};

/// Who is attempting a login and from where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Login identifier (email) or, on the code form, the pending user id
    pub identifier: String,

    /// Client IP address
    pub ip: String,
}

impl RequestContext {
    pub fn new(identifier: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ip: ip.into(),
        }
    }

    /// Stable key for attempt counters: `lower(identifier)|ip`
    pub fn throttle_key(&self) -> String {
        format!("{}|{}", self.identifier.trim().to_lowercase(), self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_key_is_case_insensitive() {
        let a = RequestContext::new("Jane@Example.com", "10.0.0.1");
        let b = RequestContext::new("jane@example.com", "10.0.0.1");
        assert_eq!(a.throttle_key(), b.throttle_key());
        assert_eq!(a.throttle_key(), "jane@example.com|10.0.0.1");
    }
}
