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

//! Parser helper methods for token stream navigation and error handling.
//!
//! This module provides utility methods for the parser including:
//! - Token stream navigation (peek, advance, check)
//! - Token matching and expectation
//! - Scope access and symbol declaration
//! - Error creation and resynchronization

use super::Parser;
use crate::ast::{Expr, ExprId, ExprKind};
use crate::error::{CompileError, ErrorCode, Span};
use crate::lexer::Token;
use crate::symbols::{ScopeChain, SymbolType};

/// Trait for parser helper operations.
pub trait ParserHelpers<'a> {
    /// Check if we've reached the end of the token stream.
    fn is_at_end(&self) -> bool;

    /// Peek at the current token without advancing.
    fn peek(&self) -> Option<&Token>;

    /// Peek at the current token's span.
    fn peek_span(&self) -> Option<Span>;

    /// Get the previous token's span (for error reporting).
    fn previous_span(&self) -> Span;

    /// Advance to the next token and return the current one.
    fn advance(&mut self) -> Option<(Token, Span)>;

    /// Check if the current token matches the expected type.
    fn check(&self, expected: &Token) -> bool;

    /// Consume the current token if it matches the expected type.
    fn match_token(&mut self, expected: &Token) -> bool;

    /// Expect the current token to match, or return an error with `code`.
    fn expect(&mut self, expected: &Token, code: ErrorCode, message: &str) -> Result<(Token, Span), CompileError>;

    /// Check if the current token ends a statement (or the input).
    fn at_statement_end(&self) -> bool;

    /// Consume the end of a statement, or fail.
    fn expect_statement_end(&mut self) -> Result<(), CompileError>;

    /// Skip empty statements.
    fn skip_end_of_statements(&mut self);

    /// Skip to the start of the next statement.
    fn synchronize(&mut self);

    /// Skip past the next `end function`.
    fn skip_past_end_function(&mut self);

    /// Create an error at the current position.
    fn error(&self, code: ErrorCode, message: impl Into<String>) -> CompileError;

    /// Create an expression node with a fresh id.
    fn make_expr(&mut self, kind: ExprKind, span: Span) -> Expr;

    /// The tables visible at the current position.
    fn scope(&self) -> ScopeChain<'_>;

    /// Declare a variable in the innermost scope.
    fn declare(&mut self, name: &str, symbol_type: SymbolType);
}

impl<'a> ParserHelpers<'a> for Parser<'a> {
    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.position).map(|(_, s)| s.clone())
    }

    fn previous_span(&self) -> Span {
        if self.position > 0 {
            self.tokens[self.position - 1].1.clone()
        } else if let Some((_, span)) = self.tokens.first() {
            span.clone()
        } else {
            Span::new(0, 0)
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let result = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(result)
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, code: ErrorCode, message: &str) -> Result<(Token, Span), CompileError> {
        if self.check(expected) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        let found = self
            .peek()
            .map_or("end of file".to_string(), |t| t.to_string());
        Err(self.error(code, format!("{}, found {}", message, found)))
    }

    fn at_statement_end(&self) -> bool {
        self.is_at_end() || self.check(&Token::EndOfStatement)
    }

    fn expect_statement_end(&mut self) -> Result<(), CompileError> {
        if self.is_at_end() || self.match_token(&Token::EndOfStatement) {
            Ok(())
        } else {
            let found = self.peek().map_or(String::new(), |t| t.to_string());
            Err(self.error(
                ErrorCode::UnexpectedToken,
                format!("Expected end of statement, found {}", found),
            ))
        }
    }

    fn skip_end_of_statements(&mut self) {
        while self.check(&Token::EndOfStatement) {
            self.advance();
        }
    }

    fn synchronize(&mut self) {
        while let Some((token, _)) = self.advance() {
            if token == Token::EndOfStatement {
                break;
            }
        }
    }

    fn skip_past_end_function(&mut self) {
        while let Some((token, _)) = self.advance() {
            if token == Token::End && self.match_token(&Token::Function) {
                break;
            }
        }
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>) -> CompileError {
        let span = self.peek_span().unwrap_or_else(|| self.previous_span());
        CompileError::new(code, message, span)
    }

    fn make_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        Expr::new(id, kind, span)
    }

    fn scope(&self) -> ScopeChain<'_> {
        match &self.local {
            Some(local) => ScopeChain::function(local, &self.program.globals),
            None => ScopeChain::top_level(&self.program.globals),
        }
    }

    fn declare(&mut self, name: &str, symbol_type: SymbolType) {
        match &mut self.local {
            Some(local) => local.insert(name, symbol_type),
            None => self.program.globals.insert(name, symbol_type),
        }
    }
}
