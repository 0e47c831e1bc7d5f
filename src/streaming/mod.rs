pub mod adapter;
pub mod sse_event;

pub use adapter::{CloseReason, StreamAdapter};
pub use sse_event::to_sse_event;
