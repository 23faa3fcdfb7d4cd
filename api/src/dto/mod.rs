//! Request and response bodies

pub mod auth;

pub use auth::{CodeSubmitRequest, LoginRequest, ResendQuery};
