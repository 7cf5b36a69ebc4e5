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

//! Function emission: bodies, exits and calls.
//!
//! This module provides:
//! - Function entry (parameter binding, local seeding)
//! - Statement emission with unreachable-code detection
//! - `return` and fall-through exits, both releasing owned strings
//! - Calls to user functions, externs and runtime primitives

use log::{debug, warn};

use super::backend::{Backend, ValueType};
use super::conversions::ConversionEmitter;
use super::expressions::ExpressionEmitter;
use super::state::EmitState;
use super::variables::VariableEmitter;
use super::{CodeGenerator, FunctionFrame, LifecycleStats};
use crate::ast::{Expr, ExprKind, FunctionAst, FunctionSignature};
use crate::error::{CompileError, CompileWarning, ErrorCode, Span, WarningCode};
use crate::runtime::{self, COPY_STRING, CREATE_STRING, NATIVE_PREFIX, RELEASE_STRING};
use crate::symbols::{CallTarget, SymbolType};

/// Extension trait for function emission.
pub trait FunctionEmitter<B: Backend> {
    /// Emit one function from entry to verification.
    fn emit_function(&mut self, function: &FunctionAst, is_entry: bool) -> Result<(), CompileError>;

    /// Bind parameters and seed locals with zero values.
    fn bind_function_locals(&mut self, signature: &FunctionSignature, handle: B::Function) -> Result<(), CompileError>;

    /// Emit one statement.
    fn emit_statement(&mut self, statement: &Expr) -> Result<(), CompileError>;

    /// Emit `return [value]`.
    fn emit_return(&mut self, value: Option<&Expr>) -> Result<(), CompileError>;

    /// Return the default value of the function's type.
    fn emit_fall_through(&mut self) -> Result<(), CompileError>;

    /// Release owned strings except `value`, then return `value`.
    fn emit_exit(&mut self, value: B::Value) -> Result<(), CompileError>;

    /// The zero value of `symbol_type`. Strings are owned empty strings.
    fn default_value(&mut self, symbol_type: SymbolType) -> Result<B::Value, CompileError>;

    /// Emit a call expression.
    fn emit_call(&mut self, call: &Expr, args: &[Expr]) -> Result<B::Value, CompileError>;

    /// The backend function a call target refers to, declaring externs on first use.
    fn callee(&mut self, target: &CallTarget, signature: &FunctionSignature) -> Result<B::Function, CompileError>;

    /// Call a runtime primitive. The result is not registered.
    fn call_primitive(&mut self, name: &str, args: &[B::Value]) -> Result<B::Value, CompileError>;

    /// Construct an owned heap string from constant text.
    fn emit_owned_string(&mut self, text: &str) -> Result<B::Value, CompileError>;

    /// Release a heap string.
    fn release(&mut self, value: B::Value) -> Result<(), CompileError>;
}

impl<'p, B: Backend> FunctionEmitter<B> for CodeGenerator<'p, B> {
    fn emit_function(&mut self, function: &FunctionAst, is_entry: bool) -> Result<(), CompileError> {
        let signature = &function.signature;
        let handle = self.functions.get(&signature.symbol_name).copied().ok_or_else(|| {
            CompileError::new(
                ErrorCode::UnresolvedCallTarget,
                format!("Function '{}' was not declared", signature.symbol_name),
                signature.span.clone(),
            )
        })?;

        if self.state.is_some() {
            return Err(CompileError::new(
                ErrorCode::InvalidEmissionState,
                format!("Cannot start '{}' inside another function", signature.name),
                signature.span.clone(),
            ));
        }
        self.state = Some(EmitState::Entry);
        self.frame = Some(FunctionFrame {
            handle,
            name: signature.name.clone(),
            return_type: signature.return_type,
            is_entry,
        });
        debug!("emitting {}", signature.symbol_name);

        let block = self.backend.append_block(handle, "entry");
        self.backend.position_at_end(block);

        let registered_before = self.lifecycle.registered();
        let released_before = self.lifecycle.released();
        self.lifecycle.push_function_scope();
        self.push_variable_scope();
        if !is_entry {
            self.bind_function_locals(signature, handle)?;
        }
        self.advance_state(EmitState::EmittingBody)?;

        for (index, statement) in function.body.iter().enumerate() {
            if self.backend.is_terminated() {
                let skipped = &function.body[index..];
                let span = skipped
                    .iter()
                    .fold(statement.span.clone(), |span, s| span.merge(&s.span));
                let message = format!(
                    "{} unreachable statement(s) after 'return' in '{}'",
                    skipped.len(),
                    signature.name
                );
                warn!("{}", message);
                self.backend.unreachable_code(&message);
                self.warnings
                    .push(CompileWarning::new(WarningCode::UnreachableCode, message, span));
                break;
            }
            self.emit_statement(statement)?;
        }

        if !self.backend.is_terminated() {
            self.emit_fall_through()?;
        }
        self.pop_variable_scope();

        self.backend.verify(handle).map_err(|message| {
            CompileError::new(
                ErrorCode::VerificationFailed,
                format!("'{}' failed verification: {}", signature.symbol_name, message),
                signature.span.clone(),
            )
        })?;
        self.advance_state(EmitState::Verified)?;

        self.stats.push(LifecycleStats {
            symbol: signature.symbol_name.clone(),
            registered: self.lifecycle.registered() - registered_before,
            released: self.lifecycle.released() - released_before,
        });
        self.frame = None;
        self.state = None;
        Ok(())
    }

    fn bind_function_locals(&mut self, signature: &FunctionSignature, handle: B::Function) -> Result<(), CompileError> {
        for (index, argument) in signature.arguments.iter().enumerate() {
            let value = self.backend.param(handle, index);
            self.bind_local(&argument.name, value);
        }

        for symbol in signature.symbols.variables() {
            if signature.arguments.iter().any(|argument| argument.name == symbol.name) {
                continue;
            }
            let value = self.default_value(symbol.symbol_type)?;
            self.bind_local(&symbol.name, value);
        }
        Ok(())
    }

    fn emit_statement(&mut self, statement: &Expr) -> Result<(), CompileError> {
        match &statement.kind {
            ExprKind::Return(value) => self.emit_return(value.as_deref()),
            _ => {
                self.emit_expression(statement)?;
                self.advance_state(EmitState::EmittingBody)
            }
        }
    }

    fn emit_return(&mut self, value: Option<&Expr>) -> Result<(), CompileError> {
        let return_type = self.frame()?.return_type;
        let value = match value {
            Some(expr) => {
                let emitted = self.emit_expression(expr)?;
                let from = self.expr_type(expr)?;
                self.cast_value(emitted, from, return_type, &expr.span)?
            }
            None => self.default_value(return_type)?,
        };

        // The caller always receives a string it owns.
        let value = if return_type == SymbolType::String && !self.lifecycle.owns(&value) {
            let copy = self.call_primitive(COPY_STRING, &[value])?;
            self.lifecycle.register(copy);
            copy
        } else {
            value
        };

        self.emit_exit(value)?;
        self.advance_state(EmitState::Terminated)
    }

    fn emit_fall_through(&mut self) -> Result<(), CompileError> {
        let return_type = self.frame()?.return_type;
        let value = self.default_value(return_type)?;
        self.emit_exit(value)?;
        self.advance_state(EmitState::FallThroughExit)
    }

    fn emit_exit(&mut self, value: B::Value) -> Result<(), CompileError> {
        let is_entry = self.frame()?.is_entry;
        let releases = self.lifecycle.unwind_function(Some(value));
        for owned in releases {
            self.release(owned)?;
        }
        if is_entry {
            self.release_string_globals()?;
        }
        self.backend.ret(value);
        Ok(())
    }

    fn default_value(&mut self, symbol_type: SymbolType) -> Result<B::Value, CompileError> {
        match symbol_type {
            SymbolType::Int => Ok(self.backend.const_int(0)),
            SymbolType::Float => Ok(self.backend.const_float(0.0)),
            SymbolType::String => self.emit_owned_string(""),
            SymbolType::Function | SymbolType::Struct => Err(CompileError::new(
                ErrorCode::NoConversionLowering,
                format!("No default value for {}", symbol_type),
                Span::default(),
            )),
        }
    }

    fn emit_call(&mut self, call: &Expr, args: &[Expr]) -> Result<B::Value, CompileError> {
        let program = self.program;
        let unresolved = || {
            CompileError::new(
                ErrorCode::UnresolvedCallTarget,
                format!("Call '{}' has no resolved target", call),
                call.span.clone(),
            )
        };
        let target = self.analysis.call_target(call.id).cloned().ok_or_else(unresolved)?;
        let signature = target.signature(program).ok_or_else(unresolved)?;

        let mut values = Vec::with_capacity(signature.arguments.len());
        for (index, parameter) in signature.arguments.iter().enumerate() {
            let expr = match (args.get(index), &parameter.default) {
                (Some(arg), _) => arg,
                (None, Some(default)) => default,
                (None, None) => return Err(unresolved()),
            };
            let value = self.emit_expression(expr)?;
            let from = self.expr_type(expr)?;
            values.push(self.cast_value(value, from, parameter.arg_type, &expr.span)?);
        }

        let function = self.callee(&target, signature)?;
        let result = self.backend.call(function, &values);
        if signature.return_type == SymbolType::String {
            self.lifecycle.register(result);
        }
        Ok(result)
    }

    fn callee(&mut self, target: &CallTarget, signature: &FunctionSignature) -> Result<B::Function, CompileError> {
        if let Some(function) = self.functions.get(&signature.symbol_name) {
            return Ok(*function);
        }
        match target {
            CallTarget::Function { .. } => Err(CompileError::new(
                ErrorCode::UnresolvedCallTarget,
                format!("Function '{}' was not declared", signature.symbol_name),
                signature.span.clone(),
            )),
            CallTarget::Extern { .. } => {
                let params: Vec<ValueType> = signature
                    .arguments
                    .iter()
                    .map(|argument| ValueType::of(argument.arg_type))
                    .collect();
                let function = self.backend.declare_function(
                    &signature.symbol_name,
                    &params,
                    ValueType::of(signature.return_type),
                    true,
                );
                debug!("declared extern {}", signature.symbol_name);
                self.functions.insert(signature.symbol_name.clone(), function);
                Ok(function)
            }
        }
    }

    fn call_primitive(&mut self, name: &str, args: &[B::Value]) -> Result<B::Value, CompileError> {
        let symbol = format!("{}{}", NATIVE_PREFIX, name);
        let function = match self.functions.get(&symbol) {
            Some(function) => *function,
            None => {
                let primitive = runtime::lookup(name).ok_or_else(|| {
                    CompileError::new(
                        ErrorCode::UnresolvedCallTarget,
                        format!("Unknown runtime primitive '{}'", name),
                        Span::default(),
                    )
                })?;
                let params: Vec<ValueType> = primitive.params.iter().map(|ty| ValueType::of(*ty)).collect();
                let function =
                    self.backend
                        .declare_function(&symbol, &params, ValueType::of(primitive.returns), true);
                self.functions.insert(symbol, function);
                function
            }
        };
        Ok(self.backend.call(function, args))
    }

    fn emit_owned_string(&mut self, text: &str) -> Result<B::Value, CompileError> {
        let constant = self.backend.const_string(text);
        let value = self.call_primitive(CREATE_STRING, &[constant])?;
        self.lifecycle.register(value);
        Ok(value)
    }

    fn release(&mut self, value: B::Value) -> Result<(), CompileError> {
        self.call_primitive(RELEASE_STRING, &[value]).map(|_| ())
    }
}
