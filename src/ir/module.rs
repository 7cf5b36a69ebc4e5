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

//! Modules, functions and blocks, and the textual listing.

use std::fmt;

use super::instr::Instr;
use super::types::{Constant, FuncId, GlobalId, ValueId};
use crate::codegen::{Initializer, ValueType};

/// A global variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub name: String,
    pub value_type: ValueType,
    pub init: Initializer,
}

/// A basic block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub name: String,
    pub instrs: Vec<Instr>,
}

impl Block {
    /// Check if the block ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.instrs.last().is_some_and(Instr::is_terminator)
    }
}

/// A function, defined or external.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<ValueType>,
    pub ret: ValueType,
    pub external: bool,
    pub blocks: Vec<Block>,
    /// Type of every value, indexed by [`ValueId`].
    pub value_types: Vec<ValueType>,
    /// Diagnostics attached during emission.
    pub notes: Vec<String>,
}

impl Function {
    /// Create a function with its parameters as the first values.
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, ret: ValueType, external: bool) -> Self {
        Self {
            name: name.into(),
            value_types: params.clone(),
            params,
            ret,
            external,
            blocks: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Allocate a new value of `value_type`.
    pub fn fresh_value(&mut self, value_type: ValueType) -> ValueId {
        self.value_types.push(value_type);
        ValueId(self.value_types.len() as u32 - 1)
    }

    /// Type of a value.
    pub fn value_type(&self, value: ValueId) -> Option<ValueType> {
        self.value_types.get(value.0 as usize).copied()
    }

    /// Total number of instructions.
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|block| block.instrs.len()).sum()
    }
}

/// A compiled program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub functions: Vec<Function>,
    pub globals: Vec<Global>,
    /// Constant string pool.
    pub strings: Vec<String>,
}

impl Module {
    /// Find a function by symbol name.
    pub fn function(&self, name: &str) -> Option<(FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, function)| function.name == name)
            .map(|(index, function)| (FuncId(index as u32), function))
    }

    /// Look up a function by id.
    pub fn function_by_id(&self, id: FuncId) -> Option<&Function> {
        self.functions.get(id.0 as usize)
    }

    /// Look up a global by id.
    pub fn global(&self, id: GlobalId) -> Option<&Global> {
        self.globals.get(id.0 as usize)
    }

    /// Add `text` to the string pool, returning its index.
    pub fn intern(&mut self, text: &str) -> u32 {
        match self.strings.iter().position(|s| s == text) {
            Some(index) => index as u32,
            None => {
                self.strings.push(text.to_string());
                self.strings.len() as u32 - 1
            }
        }
    }

    /// Number of calls from `caller` to `callee`, both by symbol name.
    pub fn count_calls(&self, caller: &str, callee: &str) -> usize {
        let (Some((_, function)), Some((callee_id, _))) = (self.function(caller), self.function(callee)) else {
            return 0;
        };
        function
            .blocks
            .iter()
            .flat_map(|block| &block.instrs)
            .filter(|instr| matches!(instr, Instr::Call { callee, .. } if *callee == callee_id))
            .count()
    }

    fn function_name(&self, id: FuncId) -> &str {
        self.function_by_id(id).map_or("<unknown>", |function| function.name.as_str())
    }

    fn global_name(&self, id: GlobalId) -> &str {
        self.global(id).map_or("<unknown>", |global| global.name.as_str())
    }

    fn write_constant(&self, f: &mut fmt::Formatter<'_>, constant: &Constant) -> fmt::Result {
        match constant {
            Constant::Int(n) => write!(f, "i32 {}", n),
            Constant::Float(n) => write!(f, "f32 {:?}", n),
            Constant::Null => write!(f, "ptr null"),
            Constant::Str(index) => {
                let text = self.strings.get(*index as usize).map_or("", String::as_str);
                write!(f, "ptr {:?}", text)
            }
        }
    }

    fn write_instr(&self, f: &mut fmt::Formatter<'_>, function: &Function, instr: &Instr) -> fmt::Result {
        write!(f, "  ")?;
        if let Some(dest) = instr.dest() {
            write!(f, "{} = ", dest)?;
        }
        match instr {
            Instr::Const { value, .. } => {
                write!(f, "const ")?;
                self.write_constant(f, value)?;
            }
            Instr::IntArith { op, left, right, .. } => write!(f, "{} i32 {}, {}", op.mnemonic(), left, right)?,
            Instr::FloatArith { op, left, right, .. } => write!(f, "f{} f32 {}, {}", op.mnemonic(), left, right)?,
            Instr::IntToFloat { value, .. } => write!(f, "sitofp {}", value)?,
            Instr::FloatToInt { value, .. } => write!(f, "fptosi {}", value)?,
            Instr::IntEq { left, right, .. } => write!(f, "icmp eq {}, {}", left, right)?,
            Instr::FloatEq { left, right, .. } => write!(f, "fcmp eq {}, {}", left, right)?,
            Instr::Load { dest, global } => {
                let value_type = function.value_type(*dest).unwrap_or(ValueType::Int);
                write!(f, "load {} @{}", value_type, self.global_name(*global))?;
            }
            Instr::Store { global, value } => write!(f, "store @{}, {}", self.global_name(*global), value)?,
            Instr::Call { dest, callee, args } => {
                let value_type = function.value_type(*dest).unwrap_or(ValueType::Int);
                write!(f, "call {} @{}(", value_type, self.function_name(*callee))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")?;
            }
            Instr::Ret { value } => write!(f, "ret {} {}", function.ret, value)?,
        }
        writeln!(f)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for global in &self.globals {
            write!(f, "global @{}: {} = ", global.name, global.value_type)?;
            match global.init {
                Initializer::Int(n) => writeln!(f, "{}", n)?,
                Initializer::Float(n) => writeln!(f, "{:?}", n)?,
                Initializer::Null => writeln!(f, "null")?,
            }
        }

        for function in self.functions.iter().filter(|function| function.external) {
            let params: Vec<String> = function.params.iter().map(ToString::to_string).collect();
            writeln!(f, "declare {} @{}({})", function.ret, function.name, params.join(", "))?;
        }

        for function in self.functions.iter().filter(|function| !function.external) {
            writeln!(f)?;
            let params: Vec<String> = function
                .params
                .iter()
                .enumerate()
                .map(|(i, ty)| format!("{} %{}", ty, i))
                .collect();
            writeln!(f, "define {} @{}({}) {{", function.ret, function.name, params.join(", "))?;
            for note in &function.notes {
                writeln!(f, "  ; {}", note)?;
            }
            for block in &function.blocks {
                writeln!(f, "{}:", block.name)?;
                for instr in &block.instrs {
                    self.write_instr(f, function, instr)?;
                }
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
