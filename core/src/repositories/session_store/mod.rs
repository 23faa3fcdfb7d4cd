pub mod memory;
pub mod repository;

pub use memory::InMemorySessionStore;
pub use repository::SessionStore;
