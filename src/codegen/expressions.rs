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

//! Expression lowering.
//!
//! This module provides expression code generation:
//! - Literals (string literals become owned heap strings)
//! - Unary and arithmetic operators
//! - Assignments
//! - String concatenation through the runtime

use super::backend::{ArithOp, Backend};
use super::conversions::ConversionEmitter;
use super::functions::FunctionEmitter;
use super::variables::VariableEmitter;
use super::CodeGenerator;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::{CompileError, ErrorCode};
use crate::runtime::CONCAT;
use crate::symbols::SymbolType;

/// Extension trait for expression lowering.
pub trait ExpressionEmitter<B: Backend> {
    /// Emit an expression and return its value.
    fn emit_expression(&mut self, expr: &Expr) -> Result<B::Value, CompileError>;

    /// Emit a unary operator.
    fn emit_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) -> Result<B::Value, CompileError>;

    /// Emit an arithmetic operator.
    fn emit_arithmetic(&mut self, expr: &Expr, op: BinaryOp, left: &Expr, right: &Expr)
        -> Result<B::Value, CompileError>;

    /// Emit `target = value`. Yields the stored value.
    fn emit_assignment(&mut self, target: &Expr, value: &Expr) -> Result<B::Value, CompileError>;
}

/// The native operation behind an arithmetic operator.
fn arith_op(op: BinaryOp) -> Option<ArithOp> {
    match op {
        BinaryOp::Add => Some(ArithOp::Add),
        BinaryOp::Sub => Some(ArithOp::Sub),
        BinaryOp::Mul => Some(ArithOp::Mul),
        BinaryOp::Div => Some(ArithOp::Div),
        BinaryOp::Assign => None,
    }
}

impl<'p, B: Backend> ExpressionEmitter<B> for CodeGenerator<'p, B> {
    fn emit_expression(&mut self, expr: &Expr) -> Result<B::Value, CompileError> {
        match &expr.kind {
            ExprKind::IntegerLiteral(n) => Ok(self.backend.const_int(*n)),
            ExprKind::FloatLiteral(n) => Ok(self.backend.const_float(*n)),
            ExprKind::StringLiteral(s) => self.emit_owned_string(s),
            ExprKind::Variable(name) => {
                let symbol_type = self.expr_type(expr)?;
                self.read_variable(name, symbol_type, &expr.span)
            }
            ExprKind::Unary { op, operand } => self.emit_unary(expr, *op, operand),
            ExprKind::Binary {
                op: BinaryOp::Assign,
                left,
                right,
            } => self.emit_assignment(left, right),
            ExprKind::Binary { op, left, right } => self.emit_arithmetic(expr, *op, left, right),
            ExprKind::Call { args, .. } => self.emit_call(expr, args),
            ExprKind::Return(_) => Err(CompileError::new(
                ErrorCode::InvalidEmissionState,
                "'return' inside an expression",
                expr.span.clone(),
            )),
        }
    }

    fn emit_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) -> Result<B::Value, CompileError> {
        let value = self.emit_expression(operand)?;
        match (op, self.expr_type(operand)?) {
            (UnaryOp::Negate, SymbolType::Int) => {
                let zero = self.backend.const_int(0);
                Ok(self.backend.int_arith(ArithOp::Sub, zero, value))
            }
            (UnaryOp::Negate, SymbolType::Float) => {
                let zero = self.backend.const_float(0.0);
                Ok(self.backend.float_arith(ArithOp::Sub, zero, value))
            }
            (UnaryOp::Not, SymbolType::Int) => {
                let zero = self.backend.const_int(0);
                Ok(self.backend.int_eq(value, zero))
            }
            (UnaryOp::Not, SymbolType::Float) => {
                let zero = self.backend.const_float(0.0);
                Ok(self.backend.float_eq(value, zero))
            }
            (op, other) => Err(CompileError::new(
                ErrorCode::NoConversionLowering,
                format!("No lowering for '{}' on {}", op.as_str(), other),
                expr.span.clone(),
            )),
        }
    }

    fn emit_arithmetic(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<B::Value, CompileError> {
        let result_type = self.expr_type(expr)?;
        let left_type = self.expr_type(left)?;
        let right_type = self.expr_type(right)?;
        let left_value = self.emit_expression(left)?;
        let right_value = self.emit_expression(right)?;

        let no_lowering = || {
            CompileError::new(
                ErrorCode::NoConversionLowering,
                format!("No lowering for '{}' on {}", op.as_str(), result_type),
                expr.span.clone(),
            )
        };
        let native = arith_op(op).ok_or_else(no_lowering)?;

        // Operands are converted right before the operation.
        let left_value = self.cast_value(left_value, left_type, result_type, &left.span)?;
        let right_value = self.cast_value(right_value, right_type, result_type, &right.span)?;

        match result_type {
            SymbolType::Int => Ok(self.backend.int_arith(native, left_value, right_value)),
            SymbolType::Float => Ok(self.backend.float_arith(native, left_value, right_value)),
            SymbolType::String if native == ArithOp::Add => {
                let joined = self.call_primitive(CONCAT, &[left_value, right_value])?;
                self.lifecycle.register(joined);
                Ok(joined)
            }
            _ => Err(no_lowering()),
        }
    }

    fn emit_assignment(&mut self, target: &Expr, value: &Expr) -> Result<B::Value, CompileError> {
        let ExprKind::Variable(name) = &target.kind else {
            return Err(CompileError::new(
                ErrorCode::UnknownVariable,
                format!("Cannot assign to '{}'", target),
                target.span.clone(),
            ));
        };
        let target_type = self.expr_type(target)?;
        let emitted = self.emit_expression(value)?;
        let value_type = self.expr_type(value)?;
        let converted = self.cast_value(emitted, value_type, target_type, &value.span)?;
        self.write_variable(name, converted, target_type, &target.span)?;
        Ok(converted)
    }
}
