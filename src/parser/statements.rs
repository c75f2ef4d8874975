//! Statement parsing
//!
//! Extends [`Parser`] with methods for statements: function definitions,
//! assignments, control flow, and blocks.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a single statement, including its trailing semicolon where required
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Token::Function(_) => self.parse_function_def(),
            Token::If(_) => self.parse_if(),
            Token::While(_) => self.parse_while(),
            Token::For(_) => self.parse_for(),
            Token::Break(loc) => {
                let location = *loc;
                self.advance();
                self.expect_semicolon()?;
                Ok(Stmt::Break { location })
            }
            Token::Continue(loc) => {
                let location = *loc;
                self.advance();
                self.expect_semicolon()?;
                Ok(Stmt::Continue { location })
            }
            Token::Return(loc) => {
                let location = *loc;
                self.advance();
                let expr = if matches!(self.peek(), Token::Semicolon(_)) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect_semicolon()?;
                Ok(Stmt::Return { expr, location })
            }
            _ => {
                let stmt = self.parse_simple_statement()?;
                self.expect_semicolon()?;
                Ok(stmt)
            }
        }
    }

    /// Parse an assignment, compound assignment, or expression statement
    /// without consuming a trailing semicolon (shared with `for` headers).
    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expression()?;
        let location = expr.location();

        match self.peek() {
            Token::Eq(_) => {
                self.advance();
                if !expr.is_lvalue() {
                    return Err(self.error("Invalid assignment target"));
                }
                let value = self.parse_expression()?;
                Ok(Stmt::Assignment {
                    target: expr,
                    value,
                    location,
                })
            }
            Token::PlusEq(_) | Token::MinusEq(_) => {
                let op = if matches!(self.peek(), Token::PlusEq(_)) {
                    BinOp::Add
                } else {
                    BinOp::Sub
                };
                self.advance();
                if !expr.is_lvalue() {
                    return Err(self.error("Invalid assignment target"));
                }
                let value = self.parse_expression()?;
                Ok(Stmt::CompoundAssignment {
                    target: expr,
                    op,
                    value,
                    location,
                })
            }
            _ => Ok(Stmt::ExpressionStatement { expr, location }),
        }
    }

    fn parse_function_def(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'function'

        let (name, _) = self.expect_ident()?;

        self.expect_lparen()?;
        let mut params = Vec::new();
        if !matches!(self.peek(), Token::RParen(_)) {
            loop {
                let (param, _) = self.expect_ident()?;
                params.push(param);
                match self.peek() {
                    Token::Comma(_) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.expect_rparen()?;

        let body = self.parse_block()?;

        Ok(Stmt::FunctionDef {
            name,
            params,
            body,
            location,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'if'

        self.expect_lparen()?;
        let condition = self.parse_expression()?;
        self.expect_rparen()?;

        let then_branch = self.parse_block()?;

        let else_branch = if matches!(self.peek(), Token::Else(_)) {
            self.advance();
            if matches!(self.peek(), Token::If(_)) {
                // else-if chains nest as a single-statement else branch
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'while'

        self.expect_lparen()?;
        let condition = self.parse_expression()?;
        self.expect_rparen()?;

        let body = self.parse_block()?;

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    /// Parse either `for (init; cond; step) { .. }` or `for (x in expr) { .. }`
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'for'

        self.expect_lparen()?;

        // `for (name in ...)` is distinguished by one-token lookahead
        if let (Token::Ident(var, _), Token::In(_)) = (self.peek().clone(), self.peek_ahead(1)) {
            self.advance(); // identifier
            self.advance(); // 'in'
            let iterable = self.parse_expression()?;
            self.expect_rparen()?;
            let body = self.parse_block()?;
            return Ok(Stmt::ForIn {
                var,
                iterable,
                body,
                location,
            });
        }

        let init = if matches!(self.peek(), Token::Semicolon(_)) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_semicolon()?;

        let condition = if matches!(self.peek(), Token::Semicolon(_)) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon()?;

        let step = if matches!(self.peek(), Token::RParen(_)) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_rparen()?;

        let body = self.parse_block()?;

        Ok(Stmt::For {
            init,
            condition,
            step,
            body,
            location,
        })
    }

    /// Parse a brace-delimited statement block
    pub(super) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect_lbrace()?;
        let mut stmts = Vec::new();
        while !matches!(self.peek(), Token::RBrace(_)) {
            if self.check_eof() {
                return Err(self.error("Unexpected end of file in block"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.expect_rbrace()?;
        Ok(stmts)
    }
}
