//! Second-factor login flow
//!
//! `TwoFactorService` drives the pending-login state machine:
//! - accept credentials, issue and deliver a token
//! - render the code form for a pending login
//! - validate a submitted code and establish the final session
//! - resend the outstanding code over SMS or voice

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::TwoFactorServiceConfig;
pub use service::{TwoFactorCollaborators, TwoFactorService};
pub use types::{CodeForm, CodeFormView, FlowOutcome, ResendResult};
