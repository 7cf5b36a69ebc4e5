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

//! Expression analysis for the semantic analyzer.
//!
//! This module provides type inference for every expression kind and
//! records each inferred type in the analysis side table.

use super::functions::FunctionAnalyzer;
use super::operators::OperatorChecker;
use super::Analyzer;
use crate::ast::{BinaryOp, Expr, ExprKind, Program};
use crate::error::{CompileError, ErrorCode, Span};
use crate::symbols::{Conversion, SymbolType};

/// Extension trait for expression analysis.
pub trait ExpressionAnalyzer {
    /// Infer the type of an expression and record it.
    fn infer(&mut self, expr: &Expr) -> Result<SymbolType, CompileError>;

    /// Resolve a variable reference.
    fn infer_variable(&self, name: &str, span: &Span) -> Result<SymbolType, CompileError>;

    /// Check `target = value` and return the target's type.
    fn infer_assignment(&mut self, target: &Expr, value: &Expr) -> Result<SymbolType, CompileError>;
}

impl<'p> ExpressionAnalyzer for Analyzer<'p> {
    fn infer(&mut self, expr: &Expr) -> Result<SymbolType, CompileError> {
        let inferred = match &expr.kind {
            ExprKind::IntegerLiteral(_) => SymbolType::Int,
            ExprKind::FloatLiteral(_) => SymbolType::Float,
            ExprKind::StringLiteral(_) => SymbolType::String,
            ExprKind::Variable(name) => self.infer_variable(name, &expr.span)?,
            ExprKind::Unary { op, operand } => {
                let operand_type = self.infer(operand)?;
                self.check_unary(*op, operand_type, &expr.span)?
            }
            ExprKind::Binary {
                op: BinaryOp::Assign,
                left,
                right,
            } => self.infer_assignment(left, right)?,
            ExprKind::Binary { op, left, right } => {
                let left_type = self.infer(left)?;
                let right_type = self.infer(right)?;
                self.check_arithmetic(left_type, *op, right_type, &expr.span)?
            }
            ExprKind::Call { callee, args } => self.infer_call(expr, callee, args)?,
            ExprKind::Return(_) => {
                return Err(CompileError::new(
                    ErrorCode::ReturnNotAtStatementStart,
                    "'return' must start a statement",
                    expr.span.clone(),
                ));
            }
        };
        Ok(self.record(expr.id, inferred))
    }

    fn infer_variable(&self, name: &str, span: &Span) -> Result<SymbolType, CompileError> {
        let program: &'p Program = self.program;
        self.context
            .scope(&program.globals)
            .is_variable(name)
            .ok_or_else(|| {
                CompileError::new(
                    ErrorCode::UndefinedVariable,
                    format!("Undefined variable '{}'", name),
                    span.clone(),
                )
                .with_hint(format!("Declare it with a type marker, e.g. '{}% = 0'", name))
            })
    }

    fn infer_assignment(&mut self, target: &Expr, value: &Expr) -> Result<SymbolType, CompileError> {
        let ExprKind::Variable(name) = &target.kind else {
            return Err(CompileError::new(
                ErrorCode::InvalidAssignmentTarget,
                "Only variables can be assigned",
                target.span.clone(),
            ));
        };
        let target_type = self.infer_variable(name, &target.span)?;
        self.record(target.id, target_type);

        let value_type = self.infer(value)?;
        if self.check_conversion(value_type, target_type, &value.span) == Conversion::Illegal {
            return Err(CompileError::new(
                ErrorCode::TypeMismatch,
                format!("Cannot assign {} to '{}' of type {}", value_type, name, target_type),
                value.span.clone(),
            ));
        }
        Ok(target_type)
    }
}
