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

//! Overload resolution by arity.

use crate::ast::{FunctionSignature, Program};

/// The signature a call resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// The `index`-th overload of user function `name`.
    Function { name: String, index: usize },
    /// Runtime-provided function `name`.
    Extern { name: String },
}

impl CallTarget {
    /// Look up the signature this target refers to.
    pub fn signature<'p>(&self, program: &'p Program) -> Option<&'p FunctionSignature> {
        match self {
            CallTarget::Function { name, index } => program
                .overloads(name)
                .get(*index)
                .map(|function| &function.signature),
            CallTarget::Extern { name } => program.externs.get(name),
        }
    }
}

/// Resolve a call of `name` with `arg_count` arguments.
///
/// A user overload whose total arity equals `arg_count` wins immediately.
/// Otherwise the overload with the largest mandatory count that still
/// accepts `arg_count` arguments is chosen, earliest definition first.
/// Externs are only considered when no user overload fits, and only with
/// an exact arity.
pub fn seek_best_match(program: &Program, name: &str, arg_count: usize) -> Option<CallTarget> {
    let mut best: Option<(usize, usize)> = None;

    for (index, function) in program.overloads(name).iter().enumerate() {
        let key = function.signature.key();
        if key.total() == arg_count {
            return Some(CallTarget::Function {
                name: name.to_string(),
                index,
            });
        }
        if key.mandatory <= arg_count && arg_count <= key.total() {
            let better = best.map_or(true, |(_, mandatory)| key.mandatory > mandatory);
            if better {
                best = Some((index, key.mandatory));
            }
        }
    }

    if let Some((index, _)) = best {
        return Some(CallTarget::Function {
            name: name.to_string(),
            index,
        });
    }

    program
        .externs
        .get(name)
        .filter(|signature| signature.total_count() == arg_count)
        .map(|_| CallTarget::Extern {
            name: name.to_string(),
        })
}
