//! Runtime error types
//!
//! Every variant carries the user-relative line the failing statement or
//! expression started on. The sandbox turns these into the `error` field of
//! a terminal trace step.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Line {line}: Variable '{name}' is not defined")]
    UndefinedVariable { name: String, line: usize },

    #[error("Line {line}: Value of type {type_name} is not callable")]
    NotCallable { type_name: String, line: usize },

    #[error("Line {line}: Type error: expected {expected}, got {got}")]
    TypeError {
        expected: String,
        got: String,
        line: usize,
    },

    #[error("Line {line}: Index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds {
        index: i64,
        len: usize,
        line: usize,
    },

    #[error("Line {line}: Object has no field '{field}'")]
    UnknownField { field: String, line: usize },

    #[error("Line {line}: Cannot access field '{field}' of null")]
    NullFieldAccess { field: String, line: usize },

    #[error("Line {line}: Function '{name}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        line: usize,
    },

    #[error("Line {line}: Division by zero")]
    DivisionByZero { line: usize },

    #[error("Line {line}: Integer overflow")]
    IntegerOverflow { line: usize },

    #[error("Line {line}: Cannot {method} from an empty list")]
    EmptyPop { method: String, line: usize },

    #[error("Line {line}: Maximum recursion depth exceeded")]
    RecursionLimit { line: usize },
}
