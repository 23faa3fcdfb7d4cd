//! Domain layer containing the token entity, session state, value objects and events.

pub mod entities;
pub mod events;
pub mod session;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::{UserRecord, VerificationToken, EXPIRATION_MINUTES};
pub use events::AuthenticatedEvent;
pub use session::{flash_error, take_flashed_errors, Session, SessionData, FLASH_ERRORS_KEY};
pub use value_objects::{
    DeliveryChannel, DeliveryOutcome, LoginCredentials, MessageTemplate, PendingLogin,
    RequestContext,
};
