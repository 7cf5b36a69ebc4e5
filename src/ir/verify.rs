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

//! Structural verification of IR functions.
//!
//! Checks that every block ends in exactly one terminator, every operand
//! is defined before use, and operand types match what each instruction
//! expects.

use std::collections::HashSet;

use thiserror::Error;

use super::instr::Instr;
use super::module::{Function, Module};
use super::types::{FuncId, ValueId};
use crate::codegen::ValueType;

/// A verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("unknown function #{0}")]
    UnknownFunction(u32),
    #[error("external function '{0}' has a body")]
    ExternalWithBody(String),
    #[error("function '{0}' has no blocks")]
    NoBlocks(String),
    #[error("block '{block}' in '{function}' does not end in a terminator")]
    Unterminated { function: String, block: String },
    #[error("instruction after the terminator of block '{block}' in '{function}'")]
    InstructionAfterTerminator { function: String, block: String },
    #[error("{value} used before definition in '{function}'")]
    UseBeforeDefinition { function: String, value: ValueId },
    #[error("type mismatch in '{function}': {detail}")]
    TypeMismatch { function: String, detail: String },
    #[error("call to '{callee}' in '{function}' passes {found} argument(s), expected {expected}")]
    ArityMismatch {
        function: String,
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("reference to an unknown {0}")]
    DanglingReference(&'static str),
}

/// Verify one function of `module`.
pub fn verify(module: &Module, id: FuncId) -> Result<(), VerifyError> {
    let function = module
        .function_by_id(id)
        .ok_or(VerifyError::UnknownFunction(id.0))?;

    if function.external {
        if function.blocks.is_empty() {
            return Ok(());
        }
        return Err(VerifyError::ExternalWithBody(function.name.clone()));
    }
    if function.blocks.is_empty() {
        return Err(VerifyError::NoBlocks(function.name.clone()));
    }

    let mut defined: HashSet<ValueId> = (0..function.params.len() as u32).map(ValueId).collect();

    for block in &function.blocks {
        if !block.is_terminated() {
            return Err(VerifyError::Unterminated {
                function: function.name.clone(),
                block: block.name.clone(),
            });
        }
        let body = &block.instrs[..block.instrs.len() - 1];
        if body.iter().any(Instr::is_terminator) {
            return Err(VerifyError::InstructionAfterTerminator {
                function: function.name.clone(),
                block: block.name.clone(),
            });
        }

        for instr in &block.instrs {
            for operand in instr.operands() {
                if !defined.contains(&operand) {
                    return Err(VerifyError::UseBeforeDefinition {
                        function: function.name.clone(),
                        value: operand,
                    });
                }
            }
            check_types(module, function, instr)?;
            if let Some(dest) = instr.dest() {
                defined.insert(dest);
            }
        }
    }
    Ok(())
}

/// Verify every function of `module`.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    (0..module.functions.len() as u32).try_for_each(|id| verify(module, FuncId(id)))
}

fn expect_type(function: &Function, value: ValueId, expected: ValueType, context: &str) -> Result<(), VerifyError> {
    match function.value_type(value) {
        Some(found) if found == expected => Ok(()),
        found => Err(VerifyError::TypeMismatch {
            function: function.name.clone(),
            detail: format!(
                "{} of {} is {}, expected {}",
                value,
                context,
                found.map_or("undefined".to_string(), |t| t.to_string()),
                expected
            ),
        }),
    }
}

fn check_types(module: &Module, function: &Function, instr: &Instr) -> Result<(), VerifyError> {
    match instr {
        Instr::Const { .. } => Ok(()),
        Instr::IntArith { left, right, .. } | Instr::IntEq { left, right, .. } => {
            expect_type(function, *left, ValueType::Int, "integer operation")?;
            expect_type(function, *right, ValueType::Int, "integer operation")
        }
        Instr::FloatArith { left, right, .. } | Instr::FloatEq { left, right, .. } => {
            expect_type(function, *left, ValueType::Float, "float operation")?;
            expect_type(function, *right, ValueType::Float, "float operation")
        }
        Instr::IntToFloat { value, .. } => expect_type(function, *value, ValueType::Int, "sitofp"),
        Instr::FloatToInt { value, .. } => expect_type(function, *value, ValueType::Float, "fptosi"),
        Instr::Load { global, .. } => module
            .global(*global)
            .map(|_| ())
            .ok_or(VerifyError::DanglingReference("global")),
        Instr::Store { global, value } => {
            let global = module
                .global(*global)
                .ok_or(VerifyError::DanglingReference("global"))?;
            expect_type(function, *value, global.value_type, "store")
        }
        Instr::Call { callee, args, .. } => {
            let target = module
                .function_by_id(*callee)
                .ok_or(VerifyError::DanglingReference("function"))?;
            if target.params.len() != args.len() {
                return Err(VerifyError::ArityMismatch {
                    function: function.name.clone(),
                    callee: target.name.clone(),
                    expected: target.params.len(),
                    found: args.len(),
                });
            }
            for (arg, param) in args.iter().zip(&target.params) {
                expect_type(function, *arg, *param, "call argument")?;
            }
            Ok(())
        }
        Instr::Ret { value } => expect_type(function, *value, function.ret, "ret"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{ArithOp, Backend};
    use crate::ir::IrBuilder;

    fn builder_with(name: &str, params: &[ValueType], ret: ValueType) -> (IrBuilder, FuncId) {
        let mut builder = IrBuilder::new();
        let f = builder.declare_function(name, params, ret, false);
        let entry = builder.append_block(f, "entry");
        builder.position_at_end(entry);
        (builder, f)
    }

    #[test]
    fn test_missing_terminator() {
        let (mut builder, f) = builder_with("f", &[], ValueType::Int);
        builder.const_int(1);
        let module = builder.finish();
        assert!(matches!(verify(&module, f), Err(VerifyError::Unterminated { .. })));
    }

    #[test]
    fn test_instruction_after_return() {
        let (mut builder, f) = builder_with("f", &[], ValueType::Int);
        let one = builder.const_int(1);
        builder.ret(one);
        builder.ret(one);
        let module = builder.finish();
        assert!(matches!(
            verify(&module, f),
            Err(VerifyError::InstructionAfterTerminator { .. })
        ));
    }

    #[test]
    fn test_return_type_mismatch() {
        let (mut builder, f) = builder_with("f", &[], ValueType::Int);
        let value = builder.const_float(1.0);
        builder.ret(value);
        let module = builder.finish();
        assert!(matches!(verify(&module, f), Err(VerifyError::TypeMismatch { .. })));
    }

    #[test]
    fn test_mixed_arithmetic_rejected() {
        let (mut builder, f) = builder_with("f", &[ValueType::Int, ValueType::Float], ValueType::Int);
        let a = builder.param(f, 0);
        let b = builder.param(f, 1);
        let sum = builder.int_arith(ArithOp::Add, a, b);
        builder.ret(sum);
        let module = builder.finish();
        assert!(matches!(verify(&module, f), Err(VerifyError::TypeMismatch { .. })));
    }

    #[test]
    fn test_call_arity_checked() {
        let (mut builder, f) = builder_with("f", &[], ValueType::Float);
        let sin = builder.declare_function("basalt_sin", &[ValueType::Float], ValueType::Float, true);
        let result = builder.call(sin, &[]);
        builder.ret(result);
        let module = builder.finish();
        assert!(matches!(verify(&module, f), Err(VerifyError::ArityMismatch { .. })));
        assert_eq!(verify(&module, sin), Ok(()));
    }

    #[test]
    fn test_valid_module() {
        let (mut builder, f) = builder_with("f", &[ValueType::Float], ValueType::Float);
        let sin = builder.declare_function("basalt_sin", &[ValueType::Float], ValueType::Float, true);
        let x = builder.param(f, 0);
        let result = builder.call(sin, &[x]);
        builder.ret(result);
        let module = builder.finish();
        assert_eq!(verify_module(&module), Ok(()));
    }
}
