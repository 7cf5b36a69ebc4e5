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

//! Variable bindings.
//!
//! Locals are SSA values rebound on assignment, searched innermost scope
//! first. Globals live in backend storage and are read and written with
//! loads and stores.
//!
//! A String global owns its value. Reading one yields a fresh copy owned
//! by the reader; writing one stores a copy and releases the old value.

use std::collections::HashMap;

use super::backend::Backend;
use super::functions::FunctionEmitter;
use super::CodeGenerator;
use crate::error::{CompileError, ErrorCode, Span};
use crate::runtime::COPY_STRING;
use crate::symbols::SymbolType;

/// Extension trait for variable access.
pub trait VariableEmitter<B: Backend> {
    /// Open a binding scope.
    fn push_variable_scope(&mut self);

    /// Close the innermost binding scope.
    fn pop_variable_scope(&mut self);

    /// Bind `name` in the innermost scope.
    fn bind_local(&mut self, name: &str, value: B::Value);

    /// Read a variable.
    fn read_variable(&mut self, name: &str, symbol_type: SymbolType, span: &Span) -> Result<B::Value, CompileError>;

    /// Write a variable.
    fn write_variable(
        &mut self,
        name: &str,
        value: B::Value,
        symbol_type: SymbolType,
        span: &Span,
    ) -> Result<(), CompileError>;

    /// Release every String global. Emitted once, when the entry function exits.
    fn release_string_globals(&mut self) -> Result<(), CompileError>;
}

impl<'p, B: Backend> VariableEmitter<B> for CodeGenerator<'p, B> {
    fn push_variable_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_variable_scope(&mut self) {
        self.scopes.pop();
    }

    fn bind_local(&mut self, name: &str, value: B::Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    fn read_variable(&mut self, name: &str, symbol_type: SymbolType, span: &Span) -> Result<B::Value, CompileError> {
        if let Some(value) = self.scopes.iter().rev().find_map(|scope| scope.get(name)) {
            return Ok(*value);
        }

        let (global, _) = *self.globals.get(name).ok_or_else(|| {
            CompileError::new(
                ErrorCode::UnknownVariable,
                format!("No binding for variable '{}'", name),
                span.clone(),
            )
        })?;
        let value = self.backend.load(global);
        if symbol_type != SymbolType::String {
            return Ok(value);
        }

        let copy = self.call_primitive(COPY_STRING, &[value])?;
        self.lifecycle.register(copy);
        Ok(copy)
    }

    fn write_variable(
        &mut self,
        name: &str,
        value: B::Value,
        symbol_type: SymbolType,
        span: &Span,
    ) -> Result<(), CompileError> {
        if let Some(scope) = self.scopes.iter_mut().rev().find(|scope| scope.contains_key(name)) {
            scope.insert(name.to_string(), value);
            return Ok(());
        }

        let (global, _) = *self.globals.get(name).ok_or_else(|| {
            CompileError::new(
                ErrorCode::UnknownVariable,
                format!("No binding for variable '{}'", name),
                span.clone(),
            )
        })?;
        if symbol_type != SymbolType::String {
            self.backend.store(global, value);
            return Ok(());
        }

        let copy = self.call_primitive(COPY_STRING, &[value])?;
        let previous = self.backend.load(global);
        self.release(previous)?;
        self.backend.store(global, copy);
        Ok(())
    }

    fn release_string_globals(&mut self) -> Result<(), CompileError> {
        let program = self.program;
        for symbol in program.globals.variables() {
            if symbol.symbol_type != SymbolType::String {
                continue;
            }
            let Some((global, _)) = self.globals.get(&symbol.name).copied() else {
                continue;
            };
            let value = self.backend.load(global);
            self.release(value)?;
            let null = self.backend.const_null();
            self.backend.store(global, null);
        }
        Ok(())
    }
}
