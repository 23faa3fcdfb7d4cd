//! Repository interfaces and in-process implementations.
//!
//! The in-memory implementations back the development profile and the test
//! suites; production deployments use the MySQL / Redis implementations in
//! `tfa_infra`.

pub mod session_store;
pub mod token;
pub mod user;

pub use session_store::{InMemorySessionStore, SessionStore};
pub use token::{InMemoryTokenRepository, TokenRepository};
pub use user::{CredentialVerifier, InMemoryUserRepository, UserLookup};
