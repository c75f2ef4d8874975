//! Lexer and recursive descent parser for the snippet language
//!
//! The pipeline is `source -> tokens -> AST`:
//! - `lexer`: character-level tokenizer producing location-tagged tokens
//! - `ast`: expression and statement definitions
//! - `parse`: the [`Parser`] struct, helpers, and the program entry point
//! - `statements` / `expressions`: `impl Parser` blocks extending the parser

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;

pub use ast::{Program, SourceLocation};
pub use parse::{ParseError, Parser};
