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

//! Symbols, the implicit-conversion lattice and name resolution.
//!
//! Variables and functions live in separate worlds: the same name may
//! appear as a variable in a [`SymbolTable`] and as one or more overloads
//! in the program's function table. Lookups always ask for a specific
//! kind of entry.

mod overload;
mod table;

pub use overload::{seek_best_match, CallTarget};
pub use table::SymbolTable;

/// The type of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    /// 32-bit signed integer (`%`).
    Int,
    /// 32-bit float (`#`).
    Float,
    /// Heap-allocated string (`$`).
    String,
    /// A function name.
    Function,
    /// Reserved for user-defined aggregates.
    Struct,
}

/// How a value of one type becomes a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same type.
    Identity,
    /// Int to Float.
    Widening,
    /// Int or Float to String.
    Stringify,
    /// Float to Int. Legal, but loses precision.
    Narrowing,
    /// No conversion exists.
    Illegal,
}

impl Conversion {
    /// Check if the conversion may be applied implicitly.
    pub fn is_legal(&self) -> bool {
        !matches!(self, Conversion::Illegal)
    }
}

impl SymbolType {
    /// Check if this type names a variable kind.
    pub fn is_variable(&self) -> bool {
        !matches!(self, SymbolType::Function)
    }

    /// Check if this type is Int or Float.
    pub fn is_numeric(&self) -> bool {
        matches!(self, SymbolType::Int | SymbolType::Float)
    }

    /// Classify the implicit conversion from `self` to `target`.
    pub fn conversion_to(&self, target: SymbolType) -> Conversion {
        use SymbolType::*;
        match (*self, target) {
            (from, to) if from == to => Conversion::Identity,
            (Int, Float) => Conversion::Widening,
            (Int, String) | (Float, String) => Conversion::Stringify,
            (Float, Int) => Conversion::Narrowing,
            _ => Conversion::Illegal,
        }
    }

    /// Check if a value of this type may be used where `target` is expected.
    pub fn can_convert(&self, target: SymbolType) -> bool {
        self.conversion_to(target).is_legal()
    }

    /// Result type of arithmetic on two operands: String > Float > Int.
    pub fn widest(left: SymbolType, right: SymbolType) -> SymbolType {
        use SymbolType::*;
        match (left, right) {
            (String, _) | (_, String) => String,
            (Float, _) | (_, Float) => Float,
            _ => left,
        }
    }

    /// Source marker for this type.
    pub fn marker(&self) -> &'static str {
        match self {
            SymbolType::Int => "%",
            SymbolType::Float => "#",
            SymbolType::String => "$",
            SymbolType::Function | SymbolType::Struct => "",
        }
    }

    /// Character used in mangled function names.
    pub fn mangle_char(&self) -> char {
        match self {
            SymbolType::Int => 'i',
            SymbolType::Float => 'f',
            SymbolType::String => 's',
            SymbolType::Function | SymbolType::Struct => 'p',
        }
    }
}

impl std::fmt::Display for SymbolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolType::Int => write!(f, "Int"),
            SymbolType::Float => write!(f, "Float"),
            SymbolType::String => write!(f, "String"),
            SymbolType::Function => write!(f, "Function"),
            SymbolType::Struct => write!(f, "Struct"),
        }
    }
}

/// A (name, type) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub symbol_type: SymbolType,
}

impl Symbol {
    /// Create a new symbol.
    pub fn new(name: impl Into<String>, symbol_type: SymbolType) -> Self {
        Self {
            name: name.into(),
            symbol_type,
        }
    }
}

/// The tables visible from one point in the program.
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'a> {
    /// The enclosing function's table; `None` at top level.
    pub local: Option<&'a SymbolTable>,
    /// The global table.
    pub global: &'a SymbolTable,
}

impl<'a> ScopeChain<'a> {
    /// Create a chain for a function body.
    pub fn function(local: &'a SymbolTable, global: &'a SymbolTable) -> Self {
        Self {
            local: Some(local),
            global,
        }
    }

    /// Create a chain for top-level statements.
    pub fn top_level(global: &'a SymbolTable) -> Self {
        Self {
            local: None,
            global,
        }
    }

    /// Resolve `name` to the first variable-kind entry, local table first.
    pub fn is_variable(&self, name: &str) -> Option<SymbolType> {
        self.local
            .and_then(|table| table.first_variable(name))
            .or_else(|| self.global.first_variable(name))
    }

    /// Check if `name` resolves to a function-local variable.
    pub fn is_local(&self, name: &str) -> bool {
        self.local
            .map(|table| table.first_variable(name).is_some())
            .unwrap_or(false)
    }
}
