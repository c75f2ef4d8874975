//! Program execution and trace event generation

pub mod builtins;
pub mod engine;
pub mod errors;

pub use engine::{run, EventKind, EventSink, NullSink, TraceEvent, RECURSION_LIMIT};
pub use errors::RuntimeError;
