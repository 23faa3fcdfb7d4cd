//! Shared utilities and common types for the second-factor login services
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (phone normalization and masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, DatabaseConfig, Environment, LoggingConfig, ServerConfig,
    SessionConfig, SmsConfig, SmsProvider, StorageBackend, ThrottleConfig, TwoFactorConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::phone;
