//! Business services containing the second-factor flow and its collaborators.

pub mod auth_guard;
pub mod code_generator;
pub mod delivery;
pub mod listeners;
pub mod throttle;
pub mod verification;

// Re-export commonly used types
pub use auth_guard::{AuthGuard, SessionAuthGuard};
pub use delivery::DeliveryGateway;
pub use listeners::{AuthenticatedListener, TokenPurgeListener};
pub use throttle::{InMemoryThrottle, LockoutResponse, ThrottleGuard};
pub use verification::{
    CodeForm, CodeFormView, FlowOutcome, ResendResult, TwoFactorCollaborators, TwoFactorService,
    TwoFactorServiceConfig,
};
