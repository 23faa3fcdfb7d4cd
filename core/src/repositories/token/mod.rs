pub mod memory;
pub mod repository;

pub use memory::InMemoryTokenRepository;
pub use repository::TokenRepository;
