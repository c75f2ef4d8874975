//! Runtime data model: values, frames, and the call stack

pub mod env;
pub mod value;

pub use env::{CallStack, Frame, MODULE_FUNCTION, SNIPPET_FILENAME};
pub use value::{Function, Value};
