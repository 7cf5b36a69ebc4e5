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

//! Operator checking for the semantic analyzer.
//!
//! This module provides type checking for unary and arithmetic operators.
//! Assignment is handled with the expressions since it needs the target.

use super::Analyzer;
use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{CompileError, ErrorCode, Span};
use crate::symbols::SymbolType;

/// Extension trait for operator type checking.
pub trait OperatorChecker {
    /// Check an arithmetic operator and return the result type.
    fn check_arithmetic(
        &self,
        left: SymbolType,
        op: BinaryOp,
        right: SymbolType,
        span: &Span,
    ) -> Result<SymbolType, CompileError>;

    /// Check a unary operator and return the result type.
    fn check_unary(&self, op: UnaryOp, operand: SymbolType, span: &Span) -> Result<SymbolType, CompileError>;
}

impl<'p> OperatorChecker for Analyzer<'p> {
    fn check_arithmetic(
        &self,
        left: SymbolType,
        op: BinaryOp,
        right: SymbolType,
        span: &Span,
    ) -> Result<SymbolType, CompileError> {
        let result = SymbolType::widest(left, right);
        if result == SymbolType::String && op != BinaryOp::Add {
            return Err(CompileError::new(
                ErrorCode::InvalidOperatorForType,
                format!("Operator '{}' cannot be applied to {} and {}", op.as_str(), left, right),
                span.clone(),
            )
            .with_hint("Only '+' is defined for strings"));
        }
        if !left.is_variable() || !right.is_variable() {
            return Err(CompileError::new(
                ErrorCode::InvalidOperatorForType,
                format!("Operator '{}' cannot be applied to {} and {}", op.as_str(), left, right),
                span.clone(),
            ));
        }
        Ok(result)
    }

    fn check_unary(&self, op: UnaryOp, operand: SymbolType, span: &Span) -> Result<SymbolType, CompileError> {
        if !operand.is_numeric() {
            return Err(CompileError::new(
                ErrorCode::InvalidOperatorForType,
                format!("Operator '{}' cannot be applied to {}", op.as_str(), operand),
                span.clone(),
            ));
        }
        Ok(match op {
            UnaryOp::Negate => operand,
            UnaryOp::Not => SymbolType::Int,
        })
    }
}
