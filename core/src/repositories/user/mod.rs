pub mod memory;
pub mod repository;

pub use memory::InMemoryUserRepository;
pub use repository::{CredentialVerifier, UserLookup};
