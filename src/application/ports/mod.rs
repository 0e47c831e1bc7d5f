pub mod repositories;

pub use repositories::ActivityRepository;
