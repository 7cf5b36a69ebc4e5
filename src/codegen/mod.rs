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

//! Code generation module for the Basalt compiler.
//!
//! This module lowers an analyzed [`Program`] through the abstract
//! [`Backend`] interface. It handles:
//! - Global and function declaration
//! - Expression lowering and implicit conversions
//! - Heap string ownership (the lifecycle stack)
//! - Returns, fall-through exits and unreachable code
//!
//! # Module Structure
//!
//! - `backend` - The Backend trait and its value types
//! - `conversions` - Implicit conversions (ConversionEmitter trait)
//! - `expressions` - Expression lowering (ExpressionEmitter trait)
//! - `functions` - Functions, returns and calls (FunctionEmitter trait)
//! - `lifecycle` - The string lifecycle stack
//! - `state` - Per-function emission states
//! - `variables` - Local and global bindings (VariableEmitter trait)

pub mod backend;
pub mod conversions;
pub mod expressions;
pub mod functions;
pub mod lifecycle;
pub mod state;
pub mod variables;

pub use backend::{ArithOp, Backend, Initializer, ValueType};
pub use lifecycle::{LifecycleStack, Releases};
pub use state::EmitState;

use std::collections::HashMap;

use log::debug;

use crate::analyzer::Analysis;
use crate::ast::{Expr, Program};
use crate::error::{CompileError, CompileWarning, ErrorCode, Span};
use crate::ir::{IrBuilder, Module};
use crate::symbols::SymbolType;
use functions::FunctionEmitter;

/// The function currently being emitted.
#[derive(Debug, Clone)]
pub struct FunctionFrame<F> {
    /// Backend handle.
    pub handle: F,
    /// Source name, for diagnostics.
    pub name: String,
    /// Declared return type.
    pub return_type: SymbolType,
    /// Whether this is the entry function.
    pub is_entry: bool,
}

/// Lifecycle counts of one emitted function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleStats {
    /// Backend symbol of the function.
    pub symbol: String,
    /// Heap strings the function took ownership of.
    pub registered: usize,
    /// Heap strings it releases on exit.
    pub released: usize,
}

/// The code generator.
pub struct CodeGenerator<'p, B: Backend> {
    /// The emission target.
    pub(crate) backend: B,
    /// The program being lowered.
    pub(crate) program: &'p Program,
    /// Resolved types and call targets.
    pub(crate) analysis: &'p Analysis,
    /// Heap string ownership.
    pub(crate) lifecycle: LifecycleStack<B::Value>,
    /// Local bindings, innermost scope last.
    pub(crate) scopes: Vec<HashMap<String, B::Value>>,
    /// Global variables.
    pub(crate) globals: HashMap<String, (B::Global, SymbolType)>,
    /// Declared functions by backend symbol.
    pub(crate) functions: HashMap<String, B::Function>,
    /// The function being emitted.
    pub(crate) frame: Option<FunctionFrame<B::Function>>,
    /// Emission state of the current function.
    pub(crate) state: Option<EmitState>,
    /// Collected warnings.
    pub(crate) warnings: Vec<CompileWarning>,
    /// Per-function lifecycle counts.
    pub(crate) stats: Vec<LifecycleStats>,
}

impl<'p, B: Backend> CodeGenerator<'p, B> {
    /// Create a new code generator.
    pub fn new(backend: B, program: &'p Program, analysis: &'p Analysis) -> Self {
        Self {
            backend,
            program,
            analysis,
            lifecycle: LifecycleStack::new(),
            scopes: Vec::new(),
            globals: HashMap::new(),
            functions: HashMap::new(),
            frame: None,
            state: None,
            warnings: Vec::new(),
            stats: Vec::new(),
        }
    }

    /// Lower the whole program.
    pub fn emit_program(&mut self) -> Result<(), CompileError> {
        let program = self.program;

        for symbol in program.globals.variables() {
            let value_type = ValueType::of(symbol.symbol_type);
            let global = self
                .backend
                .declare_global(&symbol.name, value_type, Initializer::zero(value_type));
            self.globals.insert(symbol.name, (global, symbol.symbol_type));
        }

        for function in program.all_functions() {
            let signature = &function.signature;
            let params: Vec<ValueType> = signature
                .arguments
                .iter()
                .map(|argument| ValueType::of(argument.arg_type))
                .collect();
            let handle = self.backend.declare_function(
                &signature.symbol_name,
                &params,
                ValueType::of(signature.return_type),
                false,
            );
            self.functions.insert(signature.symbol_name.clone(), handle);
        }

        for function in program.functions.values().flatten() {
            self.emit_function(function, false)?;
        }
        self.emit_function(&program.main, true)?;

        debug!(
            "generated {} function(s), {} heap string(s) registered",
            self.stats.len(),
            self.lifecycle.registered()
        );
        Ok(())
    }

    /// Per-function lifecycle counts, in emission order.
    pub fn lifecycle_stats(&self) -> &[LifecycleStats] {
        &self.stats
    }

    /// Finish and return the backend output and the warnings.
    pub fn finish(self) -> (B::Output, Vec<CompileWarning>) {
        (self.backend.finish(), self.warnings)
    }

    /// Move the current function to `next`.
    pub(crate) fn advance_state(&mut self, next: EmitState) -> Result<(), CompileError> {
        let current = self.state.ok_or_else(|| {
            CompileError::new(
                ErrorCode::InvalidEmissionState,
                format!("No function is being emitted (requested {:?})", next),
                Span::default(),
            )
        })?;
        self.state = Some(current.transition(next)?);
        Ok(())
    }

    /// The frame of the function being emitted.
    pub(crate) fn frame(&self) -> Result<&FunctionFrame<B::Function>, CompileError> {
        self.frame.as_ref().ok_or_else(|| {
            CompileError::new(
                ErrorCode::InvalidEmissionState,
                "No function is being emitted",
                Span::default(),
            )
        })
    }

    /// The resolved type of an expression.
    pub(crate) fn expr_type(&self, expr: &Expr) -> Result<SymbolType, CompileError> {
        self.analysis.type_of(expr.id).ok_or_else(|| {
            CompileError::new(
                ErrorCode::InvalidEmissionState,
                format!("Expression '{}' was not analyzed", expr),
                expr.span.clone(),
            )
        })
    }
}

/// Lower an analyzed program to the in-memory IR.
pub fn generate(program: &Program, analysis: &Analysis) -> Result<(Module, Vec<CompileWarning>), CompileError> {
    let mut generator = CodeGenerator::new(IrBuilder::new(), program, analysis);
    generator.emit_program()?;
    let (module, warnings) = generator.finish();
    debug!("lowered into {} IR function(s)", module.functions.len());
    Ok((module, warnings))
}
