pub mod models;

pub use models::{ActivityAction, ActivityEntry, NewActivity};
