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

//! The abstract emission interface.
//!
//! The code generator talks to its target only through [`Backend`]. A
//! backend hands out opaque handles for values, functions, blocks and
//! globals; the generator never looks inside them.

use std::fmt::Debug;
use std::hash::Hash;

use crate::symbols::SymbolType;

/// Machine-level value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 32-bit signed integer.
    Int,
    /// 32-bit float.
    Float,
    /// Opaque string pointer.
    Ptr,
}

impl ValueType {
    /// Representation of a source-level type.
    pub fn of(symbol_type: SymbolType) -> ValueType {
        match symbol_type {
            SymbolType::Int => ValueType::Int,
            SymbolType::Float => ValueType::Float,
            SymbolType::String | SymbolType::Function | SymbolType::Struct => ValueType::Ptr,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Int => write!(f, "i32"),
            ValueType::Float => write!(f, "f32"),
            ValueType::Ptr => write!(f, "ptr"),
        }
    }
}

/// Native arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
        }
    }
}

/// Initial value of a global.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    Int(i32),
    Float(f32),
    Null,
}

impl Initializer {
    /// The zero value of a representation.
    pub fn zero(value_type: ValueType) -> Initializer {
        match value_type {
            ValueType::Int => Initializer::Int(0),
            ValueType::Float => Initializer::Float(0.0),
            ValueType::Ptr => Initializer::Null,
        }
    }
}

/// A code generation target.
///
/// Instructions are appended at the end of the block selected with
/// [`Backend::position_at_end`].
pub trait Backend {
    /// An SSA value.
    type Value: Copy + Eq + Hash + Debug;
    /// A declared function.
    type Function: Copy + Eq + Debug;
    /// A basic block.
    type Block: Copy + Eq + Debug;
    /// A global variable.
    type Global: Copy + Eq + Debug;
    /// The finished artifact.
    type Output;

    /// Declare a function. External functions have no body and are resolved at link time.
    fn declare_function(&mut self, symbol: &str, params: &[ValueType], ret: ValueType, external: bool)
        -> Self::Function;

    /// The `index`-th incoming parameter of `function`.
    fn param(&self, function: Self::Function, index: usize) -> Self::Value;

    /// Append a new block to `function`.
    fn append_block(&mut self, function: Self::Function, name: &str) -> Self::Block;

    /// Select the block new instructions go to.
    fn position_at_end(&mut self, block: Self::Block);

    /// Check if the current block already ends in a terminator.
    fn is_terminated(&self) -> bool;

    fn const_int(&mut self, value: i32) -> Self::Value;
    fn const_float(&mut self, value: f32) -> Self::Value;
    /// A pointer to constant string data. Not a heap string.
    fn const_string(&mut self, text: &str) -> Self::Value;
    fn const_null(&mut self) -> Self::Value;

    fn int_arith(&mut self, op: ArithOp, left: Self::Value, right: Self::Value) -> Self::Value;
    fn float_arith(&mut self, op: ArithOp, left: Self::Value, right: Self::Value) -> Self::Value;
    fn int_to_float(&mut self, value: Self::Value) -> Self::Value;
    /// Truncates toward zero.
    fn float_to_int(&mut self, value: Self::Value) -> Self::Value;
    /// Int 1 if equal, else Int 0.
    fn int_eq(&mut self, left: Self::Value, right: Self::Value) -> Self::Value;
    /// Int 1 if equal, else Int 0.
    fn float_eq(&mut self, left: Self::Value, right: Self::Value) -> Self::Value;

    /// Declare a global variable.
    fn declare_global(&mut self, name: &str, value_type: ValueType, init: Initializer) -> Self::Global;
    fn load(&mut self, global: Self::Global) -> Self::Value;
    fn store(&mut self, global: Self::Global, value: Self::Value);

    /// Call `function` and return its result.
    fn call(&mut self, function: Self::Function, args: &[Self::Value]) -> Self::Value;

    /// Terminate the current block with a return.
    fn ret(&mut self, value: Self::Value);

    /// Attach a note about skipped unreachable code to the current function.
    fn unreachable_code(&mut self, note: &str);

    /// Check a finished function for structural errors.
    fn verify(&self, function: Self::Function) -> Result<(), String>;

    /// Finish and return the artifact.
    fn finish(self) -> Self::Output;
}
