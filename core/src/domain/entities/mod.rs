//! Domain entities representing core business objects.

pub mod user;
pub mod verification_token;


pub use user::UserRecord;
pub use verification_token::{VerificationToken, EXPIRATION_MINUTES};
