//! HTTP surface of the second-factor login flow

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod session;

pub use app::{create_app, AppState};
