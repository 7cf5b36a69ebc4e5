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

//! Multi-valued symbol table, one per lexical scope.

use std::collections::HashMap;

use super::{Symbol, SymbolType};

/// Mapping from name to an ordered list of entries.
///
/// Names are kept in first-insertion order so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<String, Vec<SymbolType>>,
    order: Vec<String>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `name`.
    pub fn insert(&mut self, name: impl Into<String>, symbol_type: SymbolType) {
        let name = name.into();
        match self.entries.get_mut(&name) {
            Some(types) => types.push(symbol_type),
            None => {
                self.order.push(name.clone());
                self.entries.insert(name, vec![symbol_type]);
            }
        }
    }

    /// All entries for `name`, in insertion order.
    pub fn entries(&self, name: &str) -> &[SymbolType] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First entry for `name` matching `predicate`.
    pub fn find(&self, name: &str, predicate: impl Fn(&SymbolType) -> bool) -> Option<SymbolType> {
        self.entries(name).iter().copied().find(|ty| predicate(ty))
    }

    /// First variable-kind entry for `name`.
    pub fn first_variable(&self, name: &str) -> Option<SymbolType> {
        self.find(name, SymbolType::is_variable)
    }

    /// Number of function-kind entries for `name`.
    pub fn function_count(&self, name: &str) -> usize {
        self.entries(name)
            .iter()
            .filter(|ty| **ty == SymbolType::Function)
            .count()
    }

    /// Variables declared in this table, first entry per name, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.order.iter().filter_map(|name| {
            self.first_variable(name)
                .map(|ty| Symbol::new(name.clone(), ty))
        })
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
