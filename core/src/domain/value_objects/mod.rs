//! Value objects passed between the flow controller and its collaborators.

pub mod credentials;
pub mod delivery;
pub mod message_template;
pub mod pending_login;
pub mod request_context;

pub use credentials::LoginCredentials;
pub use delivery::{DeliveryChannel, DeliveryOutcome};
pub use message_template::MessageTemplate;
pub use pending_login::PendingLogin;
pub use request_context::RequestContext;
