pub mod api;
pub mod application;
pub mod config;
pub mod db;
pub mod events;
pub mod infrastructure;
pub mod state;
pub mod streaming;
pub mod workers;
