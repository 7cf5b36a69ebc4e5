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

//! IR Builder
//!
//! Implements [`Backend`] by appending instructions to an in-memory
//! [`Module`].

use super::instr::Instr;
use super::module::{Block, Function, Global, Module};
use super::types::{BlockId, Constant, FuncId, GlobalId, ValueId};
use super::verify::verify;
use crate::codegen::{ArithOp, Backend, Initializer, ValueType};

/// Builder for constructing IR.
#[derive(Debug, Default)]
pub struct IrBuilder {
    /// Module being built.
    module: Module,
    /// Block new instructions are appended to.
    current: Option<BlockId>,
    /// Misuse detected while building, reported by the verifier.
    misuse: Vec<(Option<FuncId>, String)>,
}

impl IrBuilder {
    /// Create a new IR builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The module built so far.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Append an instruction defining a new value of `value_type`.
    fn push_value(&mut self, value_type: ValueType, make: impl FnOnce(ValueId) -> Instr) -> ValueId {
        let Some(block) = self.current else {
            self.misuse.push((None, "instruction emitted outside of a block".to_string()));
            return ValueId(u32::MAX);
        };
        let Some(function) = self.module.functions.get_mut(block.function.0 as usize) else {
            self.misuse.push((None, "block of an unknown function".to_string()));
            return ValueId(u32::MAX);
        };
        let dest = function.fresh_value(value_type);
        if let Some(target) = function.blocks.get_mut(block.index as usize) {
            target.instrs.push(make(dest));
        }
        dest
    }

    /// Append an instruction that defines no value.
    fn push(&mut self, instr: Instr) {
        let Some(block) = self.current else {
            self.misuse.push((None, "instruction emitted outside of a block".to_string()));
            return;
        };
        if let Some(target) = self
            .module
            .functions
            .get_mut(block.function.0 as usize)
            .and_then(|function| function.blocks.get_mut(block.index as usize))
        {
            target.instrs.push(instr);
        }
    }
}

impl Backend for IrBuilder {
    type Value = ValueId;
    type Function = FuncId;
    type Block = BlockId;
    type Global = GlobalId;
    type Output = Module;

    fn declare_function(&mut self, symbol: &str, params: &[ValueType], ret: ValueType, external: bool) -> FuncId {
        if let Some((id, _)) = self.module.function(symbol) {
            return id;
        }
        self.module
            .functions
            .push(Function::new(symbol, params.to_vec(), ret, external));
        FuncId(self.module.functions.len() as u32 - 1)
    }

    fn param(&self, _function: FuncId, index: usize) -> ValueId {
        ValueId(index as u32)
    }

    fn append_block(&mut self, function: FuncId, name: &str) -> BlockId {
        match self.module.functions.get_mut(function.0 as usize) {
            Some(target) => {
                target.blocks.push(Block {
                    name: name.to_string(),
                    instrs: Vec::new(),
                });
                BlockId {
                    function,
                    index: target.blocks.len() as u32 - 1,
                }
            }
            None => {
                self.misuse
                    .push((Some(function), "block appended to an unknown function".to_string()));
                BlockId { function, index: 0 }
            }
        }
    }

    fn position_at_end(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    fn is_terminated(&self) -> bool {
        self.current
            .and_then(|block| {
                self.module
                    .functions
                    .get(block.function.0 as usize)?
                    .blocks
                    .get(block.index as usize)
            })
            .is_some_and(Block::is_terminated)
    }

    fn const_int(&mut self, value: i32) -> ValueId {
        self.push_value(ValueType::Int, |dest| Instr::Const {
            dest,
            value: Constant::Int(value),
        })
    }

    fn const_float(&mut self, value: f32) -> ValueId {
        self.push_value(ValueType::Float, |dest| Instr::Const {
            dest,
            value: Constant::Float(value),
        })
    }

    fn const_string(&mut self, text: &str) -> ValueId {
        let index = self.module.intern(text);
        self.push_value(ValueType::Ptr, |dest| Instr::Const {
            dest,
            value: Constant::Str(index),
        })
    }

    fn const_null(&mut self) -> ValueId {
        self.push_value(ValueType::Ptr, |dest| Instr::Const {
            dest,
            value: Constant::Null,
        })
    }

    fn int_arith(&mut self, op: ArithOp, left: ValueId, right: ValueId) -> ValueId {
        self.push_value(ValueType::Int, |dest| Instr::IntArith { dest, op, left, right })
    }

    fn float_arith(&mut self, op: ArithOp, left: ValueId, right: ValueId) -> ValueId {
        self.push_value(ValueType::Float, |dest| Instr::FloatArith { dest, op, left, right })
    }

    fn int_to_float(&mut self, value: ValueId) -> ValueId {
        self.push_value(ValueType::Float, |dest| Instr::IntToFloat { dest, value })
    }

    fn float_to_int(&mut self, value: ValueId) -> ValueId {
        self.push_value(ValueType::Int, |dest| Instr::FloatToInt { dest, value })
    }

    fn int_eq(&mut self, left: ValueId, right: ValueId) -> ValueId {
        self.push_value(ValueType::Int, |dest| Instr::IntEq { dest, left, right })
    }

    fn float_eq(&mut self, left: ValueId, right: ValueId) -> ValueId {
        self.push_value(ValueType::Int, |dest| Instr::FloatEq { dest, left, right })
    }

    fn declare_global(&mut self, name: &str, value_type: ValueType, init: Initializer) -> GlobalId {
        self.module.globals.push(Global {
            name: name.to_string(),
            value_type,
            init,
        });
        GlobalId(self.module.globals.len() as u32 - 1)
    }

    fn load(&mut self, global: GlobalId) -> ValueId {
        let value_type = self
            .module
            .global(global)
            .map_or(ValueType::Int, |g| g.value_type);
        self.push_value(value_type, |dest| Instr::Load { dest, global })
    }

    fn store(&mut self, global: GlobalId, value: ValueId) {
        self.push(Instr::Store { global, value });
    }

    fn call(&mut self, function: FuncId, args: &[ValueId]) -> ValueId {
        let ret = self
            .module
            .function_by_id(function)
            .map_or(ValueType::Int, |callee| callee.ret);
        self.push_value(ret, |dest| Instr::Call {
            dest,
            callee: function,
            args: args.to_vec(),
        })
    }

    fn ret(&mut self, value: ValueId) {
        self.push(Instr::Ret { value });
    }

    fn unreachable_code(&mut self, note: &str) {
        if let Some(block) = self.current {
            if let Some(function) = self.module.functions.get_mut(block.function.0 as usize) {
                function.notes.push(note.to_string());
            }
        }
    }

    fn verify(&self, function: FuncId) -> Result<(), String> {
        if let Some((_, message)) = self
            .misuse
            .iter()
            .find(|(owner, _)| owner.is_none() || *owner == Some(function))
        {
            return Err(message.clone());
        }
        verify(&self.module, function).map_err(|error| error.to_string())
    }

    fn finish(self) -> Module {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn build_add() -> Module {
        let mut builder = IrBuilder::new();
        let add = builder.declare_function("add", &[ValueType::Int, ValueType::Int], ValueType::Int, false);
        let entry = builder.append_block(add, "entry");
        builder.position_at_end(entry);
        let a = builder.param(add, 0);
        let b = builder.param(add, 1);
        let sum = builder.int_arith(ArithOp::Add, a, b);
        assert!(!builder.is_terminated());
        builder.ret(sum);
        assert!(builder.is_terminated());
        assert_eq!(builder.verify(add), Ok(()));
        builder.finish()
    }

    #[test]
    fn test_parameters_come_first() {
        let module = build_add();
        let (_, function) = module.function("add").expect("add");
        assert_eq!(function.value_types, vec![ValueType::Int, ValueType::Int, ValueType::Int]);
    }

    #[test]
    fn test_listing() {
        assert_snapshot!(build_add().to_string().trim(), @r###"
        define i32 @add(i32 %0, i32 %1) {
        entry:
          %2 = add i32 %0, %1
          ret i32 %2
        }
        "###);
    }

    #[test]
    fn test_declare_function_is_idempotent() {
        let mut builder = IrBuilder::new();
        let a = builder.declare_function("basalt_sin", &[ValueType::Float], ValueType::Float, true);
        let b = builder.declare_function("basalt_sin", &[ValueType::Float], ValueType::Float, true);
        assert_eq!(a, b);
        assert_eq!(builder.module().functions.len(), 1);
    }

    #[test]
    fn test_strings_are_pooled() {
        let mut builder = IrBuilder::new();
        let f = builder.declare_function("f", &[], ValueType::Ptr, false);
        let entry = builder.append_block(f, "entry");
        builder.position_at_end(entry);
        builder.const_string("a");
        builder.const_string("a");
        builder.const_string("b");
        assert_eq!(builder.module().strings, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_emitting_without_block_fails_verification() {
        let mut builder = IrBuilder::new();
        let f = builder.declare_function("f", &[], ValueType::Int, false);
        builder.const_int(1);
        assert!(builder.verify(f).is_err());
    }
}
