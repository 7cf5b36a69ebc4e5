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

//! String lifecycle tracking.
//!
//! Every heap string the generated code creates is owned by exactly one
//! lifecycle scope until it is released. Scopes form a stack; the scope
//! pushed on function entry is a function boundary. Leaving a function
//! releases everything owned down to and including that boundary, except
//! the value being returned.
//!
//! # Release Order
//!
//! Values are released in reverse registration order.

/// Values owned by one scope.
#[derive(Debug)]
struct LifecycleScope<V> {
    owned: Vec<V>,
    function_boundary: bool,
}

/// Values that must be released, in order.
///
/// Dropping this without emitting the releases leaks them.
#[must_use = "every value in a release set must be released"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Releases<V> {
    values: Vec<V>,
}

impl<V> Releases<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: PartialEq> Releases<V> {
    pub fn contains(&self, value: &V) -> bool {
        self.values.contains(value)
    }
}

impl<V> IntoIterator for Releases<V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// The stack of lifecycle scopes.
#[derive(Debug)]
pub struct LifecycleStack<V> {
    scopes: Vec<LifecycleScope<V>>,
    registered: usize,
    released: usize,
}

impl<V: Copy + PartialEq> LifecycleStack<V> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            registered: 0,
            released: 0,
        }
    }

    /// Enter a function body.
    pub fn push_function_scope(&mut self) {
        self.scopes.push(LifecycleScope {
            owned: Vec::new(),
            function_boundary: true,
        });
    }

    /// Enter a nested block inside the current function.
    pub fn push_block_scope(&mut self) {
        self.scopes.push(LifecycleScope {
            owned: Vec::new(),
            function_boundary: false,
        });
    }

    /// Make the innermost scope the owner of `value`.
    ///
    /// Returns false if there is no open scope or the value is already owned
    /// by the current function.
    pub fn register(&mut self, value: V) -> bool {
        if self.owns(&value) {
            return false;
        }
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.owned.push(value);
                self.registered += 1;
                true
            }
            None => false,
        }
    }

    /// Check if a scope of the current function owns `value`.
    pub fn owns(&self, value: &V) -> bool {
        for scope in self.scopes.iter().rev() {
            if scope.owned.contains(value) {
                return true;
            }
            if scope.function_boundary {
                break;
            }
        }
        false
    }

    /// Leave a nested block, returning what it owned.
    ///
    /// Returns `None` when the innermost scope is a function boundary; use
    /// [`LifecycleStack::unwind_function`] for those.
    pub fn pop_block_scope(&mut self) -> Option<Releases<V>> {
        if self.scopes.last()?.function_boundary {
            return None;
        }
        let scope = self.scopes.pop()?;
        let values: Vec<V> = scope.owned.into_iter().rev().collect();
        self.released += values.len();
        Some(Releases { values })
    }

    /// Leave the current function.
    ///
    /// Pops every scope down to and including the nearest function boundary
    /// and returns all values they owned, except `keep`.
    pub fn unwind_function(&mut self, keep: Option<V>) -> Releases<V> {
        let mut values = Vec::new();
        while let Some(scope) = self.scopes.pop() {
            values.extend(scope.owned.into_iter().rev().filter(|value| Some(*value) != keep));
            if scope.function_boundary {
                break;
            }
        }
        self.released += values.len();
        Releases { values }
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Values registered so far.
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Values handed out for release so far.
    pub fn released(&self) -> usize {
        self.released
    }
}

impl<V: Copy + PartialEq> Default for LifecycleStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn released(releases: Releases<u32>) -> Vec<u32> {
        releases.into_iter().collect()
    }

    #[test]
    fn test_unwind_releases_in_reverse() {
        let mut stack = LifecycleStack::new();
        stack.push_function_scope();
        stack.register(1);
        stack.register(2);
        stack.register(3);
        assert_eq!(released(stack.unwind_function(None)), vec![3, 2, 1]);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_unwind_keeps_returned_value() {
        let mut stack = LifecycleStack::new();
        stack.push_function_scope();
        stack.register(1);
        stack.register(2);
        let releases = stack.unwind_function(Some(2));
        assert!(!releases.contains(&2));
        assert_eq!(released(releases), vec![1]);
        assert_eq!(stack.registered(), 2);
        assert_eq!(stack.released(), 1);
    }

    #[test]
    fn test_unwind_stops_at_function_boundary() {
        let mut stack = LifecycleStack::new();
        stack.push_function_scope();
        stack.register(10);
        stack.push_function_scope();
        stack.register(20);
        stack.push_block_scope();
        stack.register(21);

        assert_eq!(released(stack.unwind_function(None)), vec![21, 20]);
        assert_eq!(stack.depth(), 1);
        assert!(stack.owns(&10));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut stack = LifecycleStack::new();
        stack.push_function_scope();
        assert!(stack.register(7));
        assert!(!stack.register(7));
        assert_eq!(released(stack.unwind_function(None)), vec![7]);
    }

    #[test]
    fn test_register_without_scope() {
        let mut stack: LifecycleStack<u32> = LifecycleStack::new();
        assert!(!stack.register(1));
        assert_eq!(stack.registered(), 0);
    }

    #[test]
    fn test_owns_is_function_local() {
        let mut stack = LifecycleStack::new();
        stack.push_function_scope();
        stack.register(1);
        stack.push_function_scope();
        assert!(!stack.owns(&1));
    }

    #[test]
    fn test_pop_block_scope() {
        let mut stack = LifecycleStack::new();
        stack.push_function_scope();
        stack.register(1);
        stack.push_block_scope();
        stack.register(2);

        let releases = stack.pop_block_scope().expect("block scope");
        assert_eq!(released(releases), vec![2]);
        assert!(stack.pop_block_scope().is_none());
        assert_eq!(released(stack.unwind_function(None)), vec![1]);
    }
}
