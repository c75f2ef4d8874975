//! Expression parsing with precedence climbing
//!
//! Precedence (low to high): `||`, `&&`, equality, comparison, additive,
//! multiplicative, unary, postfix (call / index / member), primary.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Token::OrOr(_)) {
            let location = self.current_location();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while matches!(self.peek(), Token::AndAnd(_)) {
            let location = self.current_location();
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Token::EqEq(_) => BinOp::Eq,
                Token::NotEq(_) => BinOp::Ne,
                _ => break,
            };
            let location = self.current_location();
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt(_) => BinOp::Lt,
                Token::Le(_) => BinOp::Le,
                Token::Gt(_) => BinOp::Gt,
                Token::Ge(_) => BinOp::Ge,
                _ => break,
            };
            let location = self.current_location();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus(_) => BinOp::Add,
                Token::Minus(_) => BinOp::Sub,
                _ => break,
            };
            let location = self.current_location();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star(_) => BinOp::Mul,
                Token::Slash(_) => BinOp::Div,
                Token::Percent(_) => BinOp::Mod,
                _ => break,
            };
            let location = self.current_location();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Token::Minus(loc) => {
                let location = *loc;
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::UnaryOp {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                    location,
                })
            }
            Token::Bang(loc) => {
                let location = *loc;
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::UnaryOp {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    location,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parse a primary expression followed by any chain of calls, indexing,
    /// and member accesses (`a.b[i](x).c`).
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek() {
                Token::LParen(loc) => {
                    let location = *loc;
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Token::RParen(_)) {
                        loop {
                            args.push(self.parse_expression()?);
                            match self.peek() {
                                Token::Comma(_) => {
                                    self.advance();
                                }
                                _ => break,
                            }
                        }
                    }
                    self.expect_rparen()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        location,
                    };
                }
                Token::LBracket(loc) => {
                    let location = *loc;
                    self.advance();
                    let index = self.parse_expression()?;
                    match self.peek() {
                        Token::RBracket(_) => {
                            self.advance();
                        }
                        other => {
                            return Err(
                                self.error(format!("Expected ']', found {}", other.describe()))
                            );
                        }
                    }
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        location,
                    };
                }
                Token::Dot(loc) => {
                    let location = *loc;
                    self.advance();
                    let (field, _) = self.expect_ident()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field,
                        location,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::IntLiteral(n, loc) => {
                self.advance();
                Ok(Expr::IntLiteral(n, loc))
            }
            Token::FloatLiteral(x, loc) => {
                self.advance();
                Ok(Expr::FloatLiteral(x, loc))
            }
            Token::StringLiteral(s, loc) => {
                self.advance();
                Ok(Expr::StringLiteral(s, loc))
            }
            Token::True(loc) => {
                self.advance();
                Ok(Expr::BoolLiteral(true, loc))
            }
            Token::False(loc) => {
                self.advance();
                Ok(Expr::BoolLiteral(false, loc))
            }
            Token::Null(loc) => {
                self.advance();
                Ok(Expr::Null(loc))
            }
            Token::Ident(name, loc) => {
                self.advance();
                Ok(Expr::Variable(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            Token::LBracket(loc) => {
                self.advance();
                let mut elements = Vec::new();
                while !matches!(self.peek(), Token::RBracket(_)) {
                    elements.push(self.parse_expression()?);
                    match self.peek() {
                        Token::Comma(_) => {
                            self.advance();
                        }
                        Token::RBracket(_) => break,
                        other => {
                            return Err(self.error(format!(
                                "Expected ',' or ']', found {}",
                                other.describe()
                            )));
                        }
                    }
                }
                self.advance(); // consume ']'
                Ok(Expr::ListLiteral(elements, loc))
            }
            Token::LBrace(loc) => {
                self.advance();
                let mut fields = Vec::new();
                while !matches!(self.peek(), Token::RBrace(_)) {
                    let (key, _) = self.expect_ident()?;
                    match self.peek() {
                        Token::Colon(_) => {
                            self.advance();
                        }
                        other => {
                            return Err(
                                self.error(format!("Expected ':', found {}", other.describe()))
                            );
                        }
                    }
                    let value = self.parse_expression()?;
                    fields.push((key, value));
                    match self.peek() {
                        Token::Comma(_) => {
                            self.advance();
                        }
                        Token::RBrace(_) => break,
                        other => {
                            return Err(self.error(format!(
                                "Expected ',' or '}}', found {}",
                                other.describe()
                            )));
                        }
                    }
                }
                self.expect_rbrace()?;
                Ok(Expr::ObjectLiteral {
                    fields,
                    location: loc,
                })
            }
            other => Err(self.error(format!(
                "Expected expression, found {}",
                other.describe()
            ))),
        }
    }
}
