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

//! Parser module for the Basalt compiler.
//!
//! This module parses a token stream into a [`Program`] in a single pass.
//! It uses recursive descent parsing with precedence climbing for
//! expressions, binds identifiers to symbols on first use, and registers
//! function overloads as it goes.
//!
//! After a syntax error the parser resynchronizes at the next statement
//! boundary and keeps going, so one run reports every syntax error.
//!
//! # Module Structure
//!
//! - `expressions` - Expression parsing (ExpressionParser trait)
//! - `functions` - Function and extern parsing (FunctionParser trait)
//! - `helpers` - Token stream navigation and error handling (ParserHelpers trait)
//! - `statements` - Statement parsing (StatementParser trait)

// Submodules
pub mod expressions;
pub mod functions;
pub mod helpers;
pub mod statements;

// Internal imports from submodules
use helpers::ParserHelpers;
use statements::StatementParser;

use crate::ast::{ExternTable, Program};
use crate::error::{CompileError, Span};
use crate::lexer::Token;
use crate::runtime;
use crate::symbols::SymbolTable;

/// The parser state.
pub struct Parser<'a> {
    /// The token stream to parse.
    pub(crate) tokens: &'a [(Token, Span)],
    /// Current position in the token stream.
    pub(crate) position: usize,
    /// The program under construction.
    pub(crate) program: Program,
    /// Symbol table of the function being parsed.
    pub(crate) local: Option<SymbolTable>,
    /// Next expression id.
    pub(crate) next_id: u32,
    /// Errors recorded so far.
    pub(crate) errors: Vec<CompileError>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given extern signatures pre-registered.
    pub fn new(tokens: &'a [(Token, Span)], externs: ExternTable) -> Self {
        Self {
            tokens,
            position: 0,
            program: Program::new(externs),
            local: None,
            next_id: 0,
            errors: Vec::new(),
        }
    }

    // ========================================
    // Program Parsing
    // ========================================

    /// Parse the complete program.
    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        loop {
            self.skip_end_of_statements();
            if self.is_at_end() {
                break;
            }
            if let Err(error) = self.parse_top_level_statement() {
                self.errors.push(error);
                self.synchronize();
            }
        }

        if self.errors.is_empty() {
            Ok(self.program)
        } else {
            Err(self.errors)
        }
    }
}

/// Parse a token stream into a program, with the runtime library's externs.
pub fn parse(tokens: &[(Token, Span)]) -> Result<Program, Vec<CompileError>> {
    Parser::new(tokens, runtime::extern_table()).parse()
}
