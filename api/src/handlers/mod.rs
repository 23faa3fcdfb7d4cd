//! Request handlers shared across routes

pub mod error;
