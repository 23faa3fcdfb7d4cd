//! Minimal key/value session abstraction.
//!
//! The flow controller never touches cookies or stores directly; it reads and
//! writes through `&mut dyn Session`, and the HTTP layer persists the result
//! via a `SessionStore`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Session key holding flashed error messages
pub const FLASH_ERRORS_KEY: &str = "errors";

/// Per-client key/value state
pub trait Session: Send + Sync {
    fn get(&self, key: &str) -> Option<&Value>;

    fn set(&mut self, key: &str, value: Value);

    /// True when every key is present
    fn has(&self, keys: &[&str]) -> bool;

    fn forget(&mut self, keys: &[&str]);

    /// Read and remove a value
    fn pull(&mut self, key: &str) -> Option<Value> {
        let value = self.get(key).cloned();
        self.forget(&[key]);
        value
    }
}

/// Append an error message to the flash bag
pub fn flash_error(session: &mut dyn Session, message: impl Into<String>) {
    let mut errors = match session.get(FLASH_ERRORS_KEY) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    errors.push(Value::String(message.into()));
    session.set(FLASH_ERRORS_KEY, Value::Array(errors));
}

/// Drain flashed error messages
pub fn take_flashed_errors(session: &mut dyn Session) -> Vec<String> {
    match session.pull(FLASH_ERRORS_KEY) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Serializable session contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    values: HashMap<String, Value>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Session for SessionData {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn has(&self, keys: &[&str]) -> bool {
        keys.iter()
            .all(|k| self.values.get(*k).map_or(false, |v| !v.is_null()))
    }

    fn forget(&mut self, keys: &[&str]) {
        for key in keys {
            self.values.remove(*key);
        }
    }
}
