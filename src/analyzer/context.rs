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

//! Analysis context for the semantic analyzer.
//!
//! Tracks the function whose body is being analyzed: its declared return
//! type and the symbol tables its names resolve against.

use crate::ast::FunctionSignature;
use crate::symbols::{ScopeChain, SymbolTable, SymbolType};

/// Context for semantic analysis.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'p> {
    /// The signature of the function being analyzed.
    pub signature: &'p FunctionSignature,
    /// Whether this is the entry function, whose locals are the globals.
    pub is_entry: bool,
}

impl<'p> AnalysisContext<'p> {
    /// Context for a user-defined function.
    pub fn function(signature: &'p FunctionSignature) -> Self {
        Self {
            signature,
            is_entry: false,
        }
    }

    /// Context for the entry function.
    pub fn entry(signature: &'p FunctionSignature) -> Self {
        Self {
            signature,
            is_entry: true,
        }
    }

    /// The declared return type.
    pub fn return_type(&self) -> SymbolType {
        self.signature.return_type
    }

    /// The tables names resolve against.
    pub fn scope(&self, globals: &'p SymbolTable) -> ScopeChain<'p> {
        if self.is_entry {
            ScopeChain::top_level(globals)
        } else {
            ScopeChain::function(&self.signature.symbols, globals)
        }
    }
}
