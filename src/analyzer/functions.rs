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

//! Function-related analysis: calls, returns and default values.

use super::expressions::ExpressionAnalyzer;
use super::Analyzer;
use crate::ast::{Expr, FunctionArgument, Program};
use crate::error::{CompileError, ErrorCode};
use crate::symbols::{seek_best_match, Conversion, SymbolType};

/// Extension trait for function analysis.
pub trait FunctionAnalyzer {
    /// Resolve a call, check its arguments and return the result type.
    fn infer_call(&mut self, call: &Expr, callee: &str, args: &[Expr]) -> Result<SymbolType, CompileError>;

    /// Check a `return` statement against the enclosing function.
    fn check_return(&mut self, statement: &Expr, value: Option<&Expr>) -> Result<(), CompileError>;

    /// Check an argument's default value.
    fn check_default(&mut self, argument: &FunctionArgument) -> Result<(), CompileError>;

    /// Build the error for a call that matched no signature.
    fn unresolved_call(&self, call: &Expr, callee: &str, arg_count: usize) -> CompileError;
}

impl<'p> FunctionAnalyzer for Analyzer<'p> {
    fn infer_call(&mut self, call: &Expr, callee: &str, args: &[Expr]) -> Result<SymbolType, CompileError> {
        let program: &'p Program = self.program;
        let target = seek_best_match(program, callee, args.len())
            .ok_or_else(|| self.unresolved_call(call, callee, args.len()))?;
        let signature = target
            .signature(program)
            .ok_or_else(|| self.unresolved_call(call, callee, args.len()))?;

        for (arg, param) in args.iter().zip(&signature.arguments) {
            let arg_type = self.infer(arg)?;
            if self.check_conversion(arg_type, param.arg_type, &arg.span) == Conversion::Illegal {
                return Err(CompileError::new(
                    ErrorCode::ArgumentTypeMismatch,
                    format!(
                        "Argument '{}' of '{}' expects {}, found {}",
                        param.name, callee, param.arg_type, arg_type
                    ),
                    arg.span.clone(),
                ));
            }
        }

        self.record_call(call.id, target);
        Ok(signature.return_type)
    }

    fn check_return(&mut self, statement: &Expr, value: Option<&Expr>) -> Result<(), CompileError> {
        let expected = self.context.return_type();
        if let Some(value) = value {
            let found = self.infer(value)?;
            if self.check_conversion(found, expected, &value.span) == Conversion::Illegal {
                return Err(CompileError::new(
                    ErrorCode::ReturnTypeMismatch,
                    format!(
                        "'{}' returns {}, found {}",
                        self.context.signature.name, expected, found
                    ),
                    value.span.clone(),
                ));
            }
        }
        self.record(statement.id, expected);
        Ok(())
    }

    fn check_default(&mut self, argument: &FunctionArgument) -> Result<(), CompileError> {
        let Some(default) = &argument.default else {
            return Ok(());
        };
        if !default.is_constant() {
            return Err(CompileError::new(
                ErrorCode::ConstantExpressionRequired,
                format!("Default value of '{}' must be a constant", argument.name),
                default.span.clone(),
            ));
        }
        let found = self.infer(default)?;
        if self.check_conversion(found, argument.arg_type, &default.span) == Conversion::Illegal {
            return Err(CompileError::new(
                ErrorCode::TypeMismatch,
                format!(
                    "Default value of '{}' is {}, expected {}",
                    argument.name, found, argument.arg_type
                ),
                default.span.clone(),
            ));
        }
        Ok(())
    }

    fn unresolved_call(&self, call: &Expr, callee: &str, arg_count: usize) -> CompileError {
        let program: &'p Program = self.program;
        let candidates: Vec<String> = program
            .overloads(callee)
            .iter()
            .map(|function| function.signature.to_string())
            .chain(program.externs.get(callee).map(|signature| signature.to_string()))
            .collect();

        if candidates.is_empty() {
            CompileError::new(
                ErrorCode::UndefinedFunction,
                format!("Undefined function '{}'", callee),
                call.span.clone(),
            )
        } else {
            CompileError::new(
                ErrorCode::UndefinedFunction,
                format!("No signature of '{}' accepts {} argument(s)", callee, arg_count),
                call.span.clone(),
            )
            .with_hint(format!("Candidates: {}", candidates.join(", ")))
        }
    }
}
