//! Message text wrapped around a verification code.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

const PLACEHOLDER: &str = "%s";

/// Template with a `%s` placeholder, e.g. `Your verification code is %s`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, ValidationError> {
        let template = template.into();
        if !template.contains(PLACEHOLDER) {
            return Err(ValidationError::InvalidFormat {
                field: "message_template".to_string(),
            });
        }
        Ok(Self(template))
    }

    /// Substitute the first placeholder with `code`
    pub fn render(&self, code: &str) -> String {
        self.0.replacen(PLACEHOLDER, code, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self(tfa_shared::config::two_factor::DEFAULT_MESSAGE_TEMPLATE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_template() {
        let template = MessageTemplate::default();
        assert_eq!(template.render("482913"), "Your verification code is 482913");
    }

    #[test]
    fn test_only_first_placeholder_replaced() {
        let template = MessageTemplate::new("Code %s (%s)").unwrap();
        assert_eq!(template.render("1234"), "Code 1234 (%s)");
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        assert!(MessageTemplate::new("Your code").is_err());
    }
}
