// Basalt - A small typed scripting language with a verifying IR backend
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Expression parsing.
//!
//! Primary expressions first, then precedence climbing over the binary
//! operators. Identifiers are bound to symbols as they are read: the first
//! textual occurrence of a name fixes its type for the rest of the scope.

use super::helpers::ParserHelpers;
use super::Parser;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::{CompileError, ErrorCode, Span};
use crate::lexer::Token;
use crate::symbols::SymbolType;

/// Trait for expression parsing.
pub trait ExpressionParser {
    /// Parse a complete expression.
    ///
    /// With `call_first` set, an unknown identifier at the start is parsed
    /// as a call even without parentheses.
    fn parse_expression(&mut self, call_first: bool) -> Result<Expr, CompileError>;

    /// Fold binary operators with precedence of at least `min_precedence` onto `lhs`.
    fn parse_binary_rhs(&mut self, min_precedence: u8, lhs: Expr) -> Result<Expr, CompileError>;

    /// Parse a primary expression.
    fn parse_primary(&mut self, call_first: bool) -> Result<Expr, CompileError>;

    /// Parse an identifier: declaration, variable reference or call.
    fn parse_identifier(&mut self, name: String, span: Span, call_first: bool) -> Result<Expr, CompileError>;

    /// Parse the arguments of a call to `name`.
    fn parse_call(&mut self, name: String, span: Span, parenthesized: bool) -> Result<Expr, CompileError>;

    /// The binary operator at the current position, if any.
    fn peek_binary_op(&self) -> Option<BinaryOp>;
}

impl<'a> ExpressionParser for Parser<'a> {
    fn parse_expression(&mut self, call_first: bool) -> Result<Expr, CompileError> {
        let lhs = self.parse_primary(call_first)?;
        self.parse_binary_rhs(0, lhs)
    }

    fn parse_binary_rhs(&mut self, min_precedence: u8, mut lhs: Expr) -> Result<Expr, CompileError> {
        loop {
            let Some(op) = self.peek_binary_op() else {
                if self.is_at_end() || self.peek().is_some_and(Token::ends_expression) {
                    return Ok(lhs);
                }
                let found = self.peek().map_or(String::new(), |t| t.to_string());
                return Err(self.error(
                    ErrorCode::UnexpectedToken,
                    format!("Unexpected {} after expression", found),
                ));
            };
            if op.precedence() < min_precedence {
                return Ok(lhs);
            }
            self.advance();

            let mut rhs = self.parse_primary(false)?;
            while let Some(next) = self.peek_binary_op() {
                let tighter = next.precedence() > op.precedence();
                let right_assoc = next.precedence() == op.precedence() && !next.is_left_associative();
                if !tighter && !right_assoc {
                    break;
                }
                let next_min = if tighter {
                    op.precedence() + 1
                } else {
                    op.precedence()
                };
                rhs = self.parse_binary_rhs(next_min, rhs)?;
            }

            let span = lhs.span.merge(&rhs.span);
            lhs = self.make_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            );
        }
    }

    fn parse_primary(&mut self, call_first: bool) -> Result<Expr, CompileError> {
        let Some((token, span)) = self.advance() else {
            return Err(self.error(ErrorCode::UnexpectedEndOfFile, "Expected expression, found end of file"));
        };

        match token {
            Token::Integer(n) => Ok(self.make_expr(ExprKind::IntegerLiteral(n), span)),
            Token::Float(n) => Ok(self.make_expr(ExprKind::FloatLiteral(n), span)),
            Token::String(s) => Ok(self.make_expr(ExprKind::StringLiteral(s), span)),
            Token::LeftParen => {
                let inner = self.parse_expression(false)?;
                self.expect(
                    &Token::RightParen,
                    ErrorCode::ExpectedCloseParen,
                    "Expected ')' to close '('",
                )
                .map_err(|e| e.with_hint("Unmatched parenthesis"))?;
                Ok(inner)
            }
            Token::Minus | Token::Not => {
                let op = if token == Token::Minus {
                    UnaryOp::Negate
                } else {
                    UnaryOp::Not
                };
                let operand = self.parse_primary(false)?;
                let span = span.merge(&operand.span);
                Ok(self.make_expr(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            Token::Identifier(name) => self.parse_identifier(name, span, call_first),
            Token::Return => {
                if self.is_at_end() || self.peek().is_some_and(Token::ends_expression) {
                    return Ok(self.make_expr(ExprKind::Return(None), span));
                }
                let value = self.parse_expression(false)?;
                let span = span.merge(&value.span);
                Ok(self.make_expr(ExprKind::Return(Some(Box::new(value))), span))
            }
            other => Err(CompileError::new(
                ErrorCode::ExpectedExpression,
                format!("Expected expression, found {}", other),
                span,
            )),
        }
    }

    fn parse_identifier(&mut self, name: String, span: Span, call_first: bool) -> Result<Expr, CompileError> {
        let known = self.scope().is_variable(&name);

        if let Some(marked) = self.peek().and_then(Token::marker_type) {
            let marker_span = self.peek_span().unwrap_or_else(|| span.clone());
            self.advance();
            let span = span.merge(&marker_span);
            if self.check(&Token::LeftParen) {
                return Err(self
                    .error(
                        ErrorCode::UnexpectedToken,
                        format!("Unexpected ( after '{}{}'", name, marked.marker()),
                    )
                    .with_hint(format!(
                        "Drop the type marker when calling a function: write '{}(...)'",
                        name
                    )));
            }
            match known {
                None => self.declare(&name, marked),
                Some(declared) if declared != marked => {
                    return Err(CompileError::new(
                        ErrorCode::RedeclaredWithDifferentType,
                        format!(
                            "'{}' is declared as {}, cannot be used as {}",
                            name, declared, marked
                        ),
                        span,
                    )
                    .with_hint(format!("Write '{}{}'", name, declared.marker())));
                }
                Some(_) => {}
            }
            return Ok(self.make_expr(ExprKind::Variable(name), span));
        }

        if self.check(&Token::Equal) {
            if known.is_none() {
                self.declare(&name, SymbolType::Int);
            }
            return Ok(self.make_expr(ExprKind::Variable(name), span));
        }

        if self.check(&Token::LeftParen) {
            return self.parse_call(name, span, true);
        }

        let operator_follows = matches!(self.peek(), Some(Token::Plus | Token::Star | Token::Slash));
        if call_first && known.is_none() && !operator_follows {
            return self.parse_call(name, span, false);
        }

        Ok(self.make_expr(ExprKind::Variable(name), span))
    }

    fn parse_call(&mut self, name: String, span: Span, parenthesized: bool) -> Result<Expr, CompileError> {
        let mut args = Vec::new();

        if parenthesized {
            self.advance();
            if !self.match_token(&Token::RightParen) {
                loop {
                    args.push(self.parse_expression(false)?);
                    if self.match_token(&Token::Comma) {
                        continue;
                    }
                    self.expect(
                        &Token::RightParen,
                        ErrorCode::ExpectedCloseParen,
                        "Expected ')' after arguments",
                    )?;
                    break;
                }
            }
        } else if !self.at_statement_end() {
            loop {
                args.push(self.parse_expression(false)?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        let span = span.merge(&self.previous_span());
        Ok(self.make_expr(ExprKind::Call { callee: name, args }, span))
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        match self.peek()? {
            Token::Equal => Some(BinaryOp::Assign),
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        }
    }
}
