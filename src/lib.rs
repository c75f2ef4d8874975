//! Execution tracing and structure detection for algorithm snippets
//!
//! Takes an untrusted algorithm snippet, runs it in a sandboxed worker, and
//! emits a step-by-step trace in render-ready JSON: variables, call stack,
//! captured output, and heuristically detected data structures (arrays,
//! stacks, queues, linked lists, trees, heaps, grids) at every step.
//!
//! # Pipeline
//!
//! ```text
//! snippet text
//!     |  sandbox::prepare      (helper prelude + sample inputs)
//!     v
//! combined source
//!     |  parser                (lexer -> recursive descent -> AST)
//!     v
//! Program
//!     |  interpreter           (tree-walking, fires trace events)
//!     v
//! TraceEvent stream
//!     |  trace::StepRecorder   (snapshots + classify + pointers)
//!     v
//! Vec<Step>  --  serde_json  -->  front end
//! ```
//!
//! The sandbox bounds every run: a wall-clock timeout, a step cap, and
//! depth limits on every structure traversal.

pub mod interpreter;
pub mod parser;
pub mod runtime;
pub mod sandbox;
pub mod trace;

pub use sandbox::{trace_source, trace_source_with, SandboxConfig};
pub use trace::{Step, Visual, VisualKind};
