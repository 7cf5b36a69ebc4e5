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

//! Statement parsing.
//!
//! Every statement is a single expression terminated by a line break, `:`
//! or the end of input.

use super::expressions::ExpressionParser;
use super::functions::FunctionParser;
use super::helpers::ParserHelpers;
use super::Parser;
use crate::ast::Expr;
use crate::error::{CompileError, ErrorCode, Span};
use crate::lexer::Token;

/// Trait for statement parsing.
pub trait StatementParser {
    /// Parse one top-level statement, function definition or extern declaration.
    fn parse_top_level_statement(&mut self) -> Result<(), CompileError>;

    /// Parse one expression statement including its terminator.
    fn parse_statement(&mut self) -> Result<Expr, CompileError>;

    /// Parse statements up to `end function`.
    ///
    /// Errors inside the body are recorded and parsing resumes at the next
    /// statement; only a missing `end function` is returned.
    fn parse_function_body(&mut self, start: &Span) -> Result<Vec<Expr>, CompileError>;
}

impl<'a> StatementParser for Parser<'a> {
    fn parse_top_level_statement(&mut self) -> Result<(), CompileError> {
        match self.peek() {
            Some(Token::Function) => {
                self.advance();
                self.parse_function_definition()
            }
            Some(Token::Extern) => {
                self.advance();
                self.parse_extern_declaration()
            }
            Some(Token::End) => Err(self.error(
                ErrorCode::UnexpectedToken,
                "'end' without a matching 'function'",
            )),
            _ => {
                let statement = self.parse_statement()?;
                self.program.main.body.push(statement);
                Ok(())
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Expr, CompileError> {
        let expr = self.parse_expression(true)?;
        self.expect_statement_end()?;
        Ok(expr)
    }

    fn parse_function_body(&mut self, start: &Span) -> Result<Vec<Expr>, CompileError> {
        let mut body = Vec::new();

        loop {
            self.skip_end_of_statements();

            match self.peek() {
                None => {
                    self.local = None;
                    return Err(CompileError::new(
                        ErrorCode::MissingEndFunction,
                        "Function body is not closed",
                        start.merge(&self.previous_span()),
                    )
                    .with_hint("Add 'end function'"));
                }
                Some(Token::End) => {
                    self.advance();
                    let closed = self.expect(
                        &Token::Function,
                        ErrorCode::ExpectedFunctionAfterEnd,
                        "Expected 'function' after 'end'",
                    );
                    match closed.and_then(|_| self.expect_statement_end()) {
                        Ok(()) => break,
                        Err(error) => {
                            self.errors.push(error);
                            self.synchronize();
                            break;
                        }
                    }
                }
                Some(Token::Function) => {
                    let error = self.error(ErrorCode::NestedDefinition, "Functions cannot be defined inside a function");
                    self.errors.push(error);
                    self.advance();
                    self.skip_past_end_function();
                }
                Some(Token::Extern) => {
                    let error = self.error(ErrorCode::NestedDefinition, "Externs cannot be declared inside a function");
                    self.errors.push(error);
                    self.synchronize();
                }
                Some(_) => match self.parse_statement() {
                    Ok(statement) => body.push(statement),
                    Err(error) => {
                        self.errors.push(error);
                        self.synchronize();
                    }
                },
            }
        }

        Ok(body)
    }
}
