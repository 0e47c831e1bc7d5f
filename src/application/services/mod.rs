pub mod board_notifier;

pub use board_notifier::{BoardChange, BoardNotifier};
