//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: Parsing statements (functions, if, while, for, etc.)
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Error)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            location: e.location,
        }
    }
}

/// Recursive descent parser over the token stream
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) position: usize,
}

impl Parser {
    /// Tokenize the source and create a parser over it
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
        })
    }

    /// Parse the whole program: a sequence of module-level statements
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.check_eof() {
            program.stmts.push(self.parse_statement()?);
        }

        Ok(program)
    }

    // ========== Token stream helpers ==========

    pub(super) fn peek(&self) -> &Token {
        // Token stream always ends with Eof
        self.tokens
            .get(self.position)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    pub(super) fn peek_ahead(&self, n: usize) -> &Token {
        self.tokens
            .get(self.position + n)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    pub(super) fn check_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(super) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(super) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(super) fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Semicolon(_) => {
                self.advance();
                Ok(())
            }
            other => Err(self.error(format!("Expected ';', found {}", other.describe()))),
        }
    }

    pub(super) fn expect_lparen(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::LParen(_) => {
                self.advance();
                Ok(())
            }
            other => Err(self.error(format!("Expected '(', found {}", other.describe()))),
        }
    }

    pub(super) fn expect_rparen(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::RParen(_) => {
                self.advance();
                Ok(())
            }
            other => Err(self.error(format!("Expected ')', found {}", other.describe()))),
        }
    }

    pub(super) fn expect_lbrace(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::LBrace(_) => {
                self.advance();
                Ok(())
            }
            other => Err(self.error(format!("Expected '{{', found {}", other.describe()))),
        }
    }

    pub(super) fn expect_rbrace(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::RBrace(_) => {
                self.advance();
                Ok(())
            }
            other => Err(self.error(format!("Expected '}}', found {}", other.describe()))),
        }
    }

    pub(super) fn expect_ident(&mut self) -> Result<(String, SourceLocation), ParseError> {
        match self.peek().clone() {
            Token::Ident(name, loc) => {
                self.advance();
                Ok((name, loc))
            }
            other => Err(self.error(format!("Expected identifier, found {}", other.describe()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let mut parser = Parser::new("arr = [3, 1, 2];").unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.stmts.len(), 1);
        assert!(matches!(program.stmts[0], Stmt::Assignment { .. }));
    }

    #[test]
    fn test_parse_function() {
        let source = r#"
            function add(a, b) {
                return a + b;
            }
            x = add(1, 2);
        "#;
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.stmts.len(), 2);
        match &program.stmts[0] {
            Stmt::FunctionDef { name, params, body, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params, &["a".to_string(), "b".to_string()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_variants() {
        let source = r#"
            for (i = 0; i < 10; i += 1) { x = i; }
            for (v in arr) { y = v; }
        "#;
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert!(matches!(program.stmts[0], Stmt::For { .. }));
        assert!(matches!(program.stmts[1], Stmt::ForIn { .. }));
    }

    #[test]
    fn test_parse_object_literal() {
        let mut parser = Parser::new("node = { val: 1, next: null };").unwrap();
        let program = parser.parse_program().unwrap();

        match &program.stmts[0] {
            Stmt::Assignment { value, .. } => match value {
                Expr::ObjectLiteral { fields, .. } => {
                    assert_eq!(fields.len(), 2);
                    assert_eq!(fields[0].0, "val");
                    assert_eq!(fields[1].0, "next");
                }
                other => panic!("Expected object literal, got {:?}", other),
            },
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_invalid_assignment_target() {
        let mut parser = Parser::new("1 + 2 = 3;").unwrap();
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_statement_lines() {
        let mut parser = Parser::new("x = 1;\ny = 2;\n").unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.stmts[0].location().line, 1);
        assert_eq!(program.stmts[1].location().line, 2);
    }
}
