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

//! Abstract Syntax Tree (AST) definitions for the Basalt compiler.
//!
//! This module defines the data structures that represent a parsed Basalt program.

mod expr;
mod function;

pub use expr::*;
pub use function::*;

use std::collections::BTreeMap;

use crate::error::Span;
use crate::symbols::{SymbolTable, SymbolType};

/// Reserved name of the synthesized entry function.
///
/// Identifiers cannot start with `_`, so no user function collides with it.
pub const ENTRY_FUNCTION: &str = "__main";

/// User functions by name; each name maps to its overloads in definition order.
pub type FunctionTable = BTreeMap<String, Vec<FunctionAst>>;

/// Extern signatures by name. Externs are never overloaded.
pub type ExternTable = BTreeMap<String, FunctionSignature>;

/// A complete Basalt program.
#[derive(Debug, Clone)]
pub struct Program {
    /// Global variables (and function names).
    pub globals: SymbolTable,
    /// User-defined functions.
    pub functions: FunctionTable,
    /// Runtime-provided functions.
    pub externs: ExternTable,
    /// Every statement written outside a function definition.
    pub main: FunctionAst,
}

impl Program {
    /// Create an empty program with the given externs.
    pub fn new(externs: ExternTable) -> Self {
        let signature = FunctionSignature {
            name: ENTRY_FUNCTION.to_string(),
            return_type: SymbolType::Int,
            arguments: Vec::new(),
            symbols: SymbolTable::new(),
            symbol_name: ENTRY_FUNCTION.to_string(),
            is_extern: false,
            span: Span::default(),
        };
        Self {
            globals: SymbolTable::new(),
            functions: FunctionTable::new(),
            externs,
            main: FunctionAst::new(signature, Vec::new()),
        }
    }

    /// All overloads registered under `name`.
    pub fn overloads(&self, name: &str) -> &[FunctionAst] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over all user functions, entry function last.
    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionAst> {
        self.functions
            .values()
            .flat_map(|overloads| overloads.iter())
            .chain(std::iter::once(&self.main))
    }
}
