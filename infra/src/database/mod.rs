//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management and embedded migrations
//! - The `tfa_tokens` token store
//! - A read-only view of the `users` table

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{MySqlTokenRepository, MySqlUserRepository};
