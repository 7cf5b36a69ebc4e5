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

//! Implicit conversions.
//!
//! Mirrors the conversion lattice of the type checker. Stringification
//! creates a heap string owned by the current scope.

use super::backend::Backend;
use super::functions::FunctionEmitter;
use super::CodeGenerator;
use crate::error::{CompileError, ErrorCode, Span};
use crate::runtime::{FLOAT_TO_STRING, INT_TO_STRING};
use crate::symbols::SymbolType;

/// Extension trait for conversions.
pub trait ConversionEmitter<B: Backend> {
    /// Convert `value` from `from` to `to`.
    fn cast_value(&mut self, value: B::Value, from: SymbolType, to: SymbolType, span: &Span)
        -> Result<B::Value, CompileError>;

    /// Format a number as an owned heap string.
    fn stringify(&mut self, value: B::Value, from: SymbolType, span: &Span) -> Result<B::Value, CompileError>;
}

impl<'p, B: Backend> ConversionEmitter<B> for CodeGenerator<'p, B> {
    fn cast_value(
        &mut self,
        value: B::Value,
        from: SymbolType,
        to: SymbolType,
        span: &Span,
    ) -> Result<B::Value, CompileError> {
        match (from, to) {
            (from, to) if from == to => Ok(value),
            (SymbolType::Int, SymbolType::Float) => Ok(self.backend.int_to_float(value)),
            (SymbolType::Float, SymbolType::Int) => Ok(self.backend.float_to_int(value)),
            (SymbolType::Int | SymbolType::Float, SymbolType::String) => self.stringify(value, from, span),
            _ => Err(CompileError::new(
                ErrorCode::NoConversionLowering,
                format!("No conversion from {} to {}", from, to),
                span.clone(),
            )),
        }
    }

    fn stringify(&mut self, value: B::Value, from: SymbolType, span: &Span) -> Result<B::Value, CompileError> {
        let primitive = match from {
            SymbolType::Int => INT_TO_STRING,
            SymbolType::Float => FLOAT_TO_STRING,
            other => {
                return Err(CompileError::new(
                    ErrorCode::NoConversionLowering,
                    format!("Cannot format {} as a string", other),
                    span.clone(),
                ));
            }
        };
        let text = self.call_primitive(primitive, &[value])?;
        self.lifecycle.register(text);
        Ok(text)
    }
}
