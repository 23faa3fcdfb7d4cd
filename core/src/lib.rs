//! # TFAuth Core
//!
//! Verification-token lifecycle and the second-factor login flow.
//! This crate contains the token entity, the pending-login session state,
//! collaborator traits (token store, user directory, delivery gateway,
//! throttle guard, auth guard) and the `TwoFactorService` that drives a
//! login from accepted credentials to a fully authenticated session.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
