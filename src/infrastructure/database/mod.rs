pub mod memory_repo;

pub use memory_repo::{InMemoryActivityRepository, DEFAULT_ACTIVITY_RETENTION};
