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

//! IR instructions.

use super::types::{Constant, FuncId, GlobalId, ValueId};
use crate::codegen::ArithOp;

/// An instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    // ============ Values ============
    Const {
        dest: ValueId,
        value: Constant,
    },

    // ============ Arithmetic ============
    IntArith {
        dest: ValueId,
        op: ArithOp,
        left: ValueId,
        right: ValueId,
    },
    FloatArith {
        dest: ValueId,
        op: ArithOp,
        left: ValueId,
        right: ValueId,
    },
    IntToFloat {
        dest: ValueId,
        value: ValueId,
    },
    FloatToInt {
        dest: ValueId,
        value: ValueId,
    },
    /// Int 1 when equal, else 0.
    IntEq {
        dest: ValueId,
        left: ValueId,
        right: ValueId,
    },
    /// Int 1 when equal, else 0.
    FloatEq {
        dest: ValueId,
        left: ValueId,
        right: ValueId,
    },

    // ============ Memory ============
    Load {
        dest: ValueId,
        global: GlobalId,
    },
    Store {
        global: GlobalId,
        value: ValueId,
    },

    // ============ Control ============
    Call {
        dest: ValueId,
        callee: FuncId,
        args: Vec<ValueId>,
    },
    Ret {
        value: ValueId,
    },
}

impl Instr {
    /// The value this instruction defines.
    pub fn dest(&self) -> Option<ValueId> {
        match self {
            Instr::Const { dest, .. }
            | Instr::IntArith { dest, .. }
            | Instr::FloatArith { dest, .. }
            | Instr::IntToFloat { dest, .. }
            | Instr::FloatToInt { dest, .. }
            | Instr::IntEq { dest, .. }
            | Instr::FloatEq { dest, .. }
            | Instr::Load { dest, .. }
            | Instr::Call { dest, .. } => Some(*dest),
            Instr::Store { .. } | Instr::Ret { .. } => None,
        }
    }

    /// The values this instruction reads.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Instr::Const { .. } | Instr::Load { .. } => Vec::new(),
            Instr::IntArith { left, right, .. }
            | Instr::FloatArith { left, right, .. }
            | Instr::IntEq { left, right, .. }
            | Instr::FloatEq { left, right, .. } => vec![*left, *right],
            Instr::IntToFloat { value, .. }
            | Instr::FloatToInt { value, .. }
            | Instr::Store { value, .. }
            | Instr::Ret { value } => vec![*value],
            Instr::Call { args, .. } => args.clone(),
        }
    }

    /// Check if this instruction ends a block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instr::Ret { .. })
    }
}
