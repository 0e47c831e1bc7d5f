pub mod boundary_logger;
pub mod trace_context;

pub use boundary_logger::{BoundaryLogger, StreamSummary, Timer};
pub use trace_context::{TraceContext, TraceId, TRACE_ID_HEADER};
