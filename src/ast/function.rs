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

//! Function signatures and definitions.

use super::Expr;
use crate::error::Span;
use crate::runtime::NATIVE_PREFIX;
use crate::symbols::{SymbolTable, SymbolType};

/// A function argument.
#[derive(Debug, Clone)]
pub struct FunctionArgument {
    /// Argument name.
    pub name: String,
    /// Declared type.
    pub arg_type: SymbolType,
    /// Default value; an argument with a default is optional.
    pub default: Option<Expr>,
    /// Source span.
    pub span: Span,
}

impl FunctionArgument {
    /// Create a new argument.
    pub fn new(name: impl Into<String>, arg_type: SymbolType, default: Option<Expr>, span: Span) -> Self {
        Self {
            name: name.into(),
            arg_type,
            default,
            span,
        }
    }

    /// Check if the argument must be supplied by the caller.
    pub fn is_mandatory(&self) -> bool {
        self.default.is_none()
    }
}

/// The overload shape of a signature: (mandatory, optional) argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    pub mandatory: usize,
    pub optional: usize,
}

impl SignatureKey {
    /// Total number of arguments.
    pub fn total(&self) -> usize {
        self.mandatory + self.optional
    }
}

impl std::fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} mandatory, {} optional", self.mandatory, self.optional)
    }
}

/// A function signature, user-defined or extern.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Source-level name.
    pub name: String,
    /// Declared return type.
    pub return_type: SymbolType,
    /// Ordered arguments.
    pub arguments: Vec<FunctionArgument>,
    /// The function's own symbol table, seeded with its arguments.
    pub symbols: SymbolTable,
    /// Unique backend symbol name, computed once at construction.
    pub symbol_name: String,
    /// Whether the body is supplied by the runtime.
    pub is_extern: bool,
    /// Source span of the signature.
    pub span: Span,
}

impl FunctionSignature {
    /// Create a user function signature.
    pub fn new(
        name: impl Into<String>,
        return_type: SymbolType,
        arguments: Vec<FunctionArgument>,
        symbols: SymbolTable,
        span: Span,
    ) -> Self {
        let name = name.into();
        let key = Self::key_of(&arguments);
        let symbol_name = format!(
            "{}{}_{}_{}",
            return_type.mangle_char(),
            name,
            key.mandatory,
            key.optional
        );
        Self {
            name,
            return_type,
            arguments,
            symbols,
            symbol_name,
            is_extern: false,
            span,
        }
    }

    /// Create an extern signature resolved by the runtime.
    pub fn external(
        name: impl Into<String>,
        return_type: SymbolType,
        arguments: Vec<FunctionArgument>,
        span: Span,
    ) -> Self {
        let name = name.into();
        let mut symbols = SymbolTable::new();
        for arg in &arguments {
            symbols.insert(arg.name.clone(), arg.arg_type);
        }
        Self {
            symbol_name: format!("{}{}", NATIVE_PREFIX, name),
            name,
            return_type,
            arguments,
            symbols,
            is_extern: true,
            span,
        }
    }

    fn key_of(arguments: &[FunctionArgument]) -> SignatureKey {
        let mandatory = arguments.iter().filter(|a| a.is_mandatory()).count();
        SignatureKey {
            mandatory,
            optional: arguments.len() - mandatory,
        }
    }

    /// The overload shape of this signature.
    pub fn key(&self) -> SignatureKey {
        Self::key_of(&self.arguments)
    }

    /// Number of arguments without defaults.
    pub fn mandatory_count(&self) -> usize {
        self.key().mandatory
    }

    /// Total number of arguments.
    pub fn total_count(&self) -> usize {
        self.arguments.len()
    }
}

impl std::fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}(", self.name, self.return_type.marker())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}{}", arg.name, arg.arg_type.marker())?;
            if let Some(default) = &arg.default {
                write!(f, " = {}", default)?;
            }
        }
        write!(f, ")")
    }
}

/// A function definition: a signature plus its body statements.
#[derive(Debug, Clone)]
pub struct FunctionAst {
    pub signature: FunctionSignature,
    pub body: Vec<Expr>,
}

impl FunctionAst {
    /// Create a new function definition.
    pub fn new(signature: FunctionSignature, body: Vec<Expr>) -> Self {
        Self { signature, body }
    }
}
