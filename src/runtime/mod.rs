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

//! Runtime support library for generated code.
//!
//! Provides the string primitives every program depends on, a small math
//! and I/O library, and the registry that exposes both to the parser as
//! extern signatures. Native symbols carry the [`NATIVE_PREFIX`].

mod heap;
mod library;

pub use heap::StringHeap;
pub use library::{extern_table, lookup, RuntimeFunction, LIBRARY};

use std::io::Write;

use thiserror::Error;

/// Prefix of every native runtime symbol.
pub const NATIVE_PREFIX: &str = "basalt_";

/// Construct a heap string from a raw string constant.
pub const CREATE_STRING: &str = "create_string__";
/// Duplicate a heap string.
pub const COPY_STRING: &str = "copy_string__";
/// Format an Int as a heap string.
pub const INT_TO_STRING: &str = "int_to_string__";
/// Format a Float as a heap string.
pub const FLOAT_TO_STRING: &str = "float_to_string__";
/// Concatenate two strings into a new heap string.
pub const CONCAT: &str = "concat";
/// Release a heap string.
pub const RELEASE_STRING: &str = "release_string__";

/// A runtime value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Ptr(Pointer),
}

/// An opaque string pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pointer {
    /// The empty, never-allocated string.
    Null,
    /// A constant from the program's string pool.
    Static(u32),
    /// A heap string owned by generated code.
    Heap(u32),
}

/// Errors raised while executing a program.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    #[error("string #{0} released twice")]
    DoubleRelease(u32),
    #[error("string #{0} used after release")]
    UseAfterRelease(u32),
    #[error("invalid string pointer")]
    InvalidPointer,
    #[error("integer division by zero")]
    DivisionByZero,
    #[error("unresolved external symbol '{0}'")]
    UnresolvedSymbol(String),
    #[error("entry function '{0}' not found")]
    MissingEntry(String),
    #[error("call depth exceeded {0} frames")]
    StackOverflow(usize),
    #[error("invalid argument to '{function}': expected {expected}")]
    InvalidArgument {
        function: String,
        expected: &'static str,
    },
    #[error("{0} heap string(s) still live after the program finished")]
    LeakedStrings(usize),
    #[error("malformed program: {0}")]
    Malformed(String),
    #[error("output error: {0}")]
    Output(String),
}

enum Output {
    Stdout,
    Buffer(Vec<u8>),
}

/// Runtime state shared by all native functions of one execution.
pub struct Runtime {
    heap: StringHeap,
    statics: Vec<String>,
    output: Output,
}

impl Runtime {
    /// Create a runtime printing to standard output.
    pub fn new() -> Self {
        Self {
            heap: StringHeap::new(),
            statics: Vec::new(),
            output: Output::Stdout,
        }
    }

    /// Create a runtime collecting output in memory.
    pub fn capturing() -> Self {
        Self {
            output: Output::Buffer(Vec::new()),
            ..Self::new()
        }
    }

    /// Output collected so far by a capturing runtime.
    pub fn captured_output(&self) -> Option<String> {
        match &self.output {
            Output::Stdout => None,
            Output::Buffer(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// The string heap.
    pub fn heap(&self) -> &StringHeap {
        &self.heap
    }

    /// Add a constant to the string pool.
    pub fn intern(&mut self, text: &str) -> Pointer {
        let index = match self.statics.iter().position(|s| s == text) {
            Some(index) => index,
            None => {
                self.statics.push(text.to_string());
                self.statics.len() - 1
            }
        };
        Pointer::Static(index as u32)
    }

    /// Read the text behind any string pointer.
    pub fn read(&self, pointer: Pointer) -> Result<&str, RuntimeError> {
        match pointer {
            Pointer::Null => Ok(""),
            Pointer::Static(index) => self
                .statics
                .get(index as usize)
                .map(String::as_str)
                .ok_or(RuntimeError::InvalidPointer),
            Pointer::Heap(handle) => self.heap.get(handle),
        }
    }

    /// Allocate a heap string.
    pub fn alloc(&mut self, text: String) -> Value {
        Value::Ptr(self.heap.alloc(text))
    }

    /// Release a heap string.
    pub fn release(&mut self, pointer: Pointer) -> Result<(), RuntimeError> {
        self.heap.release(pointer)
    }

    /// Write program output.
    pub fn write(&mut self, text: &str) -> Result<(), RuntimeError> {
        match &mut self.output {
            Output::Stdout => {
                let mut stdout = std::io::stdout();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| RuntimeError::Output(e.to_string()))
            }
            Output::Buffer(bytes) => {
                bytes.extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }

    /// Invoke the native function behind `symbol`.
    pub fn call(&mut self, symbol: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let function = lookup(symbol).ok_or_else(|| RuntimeError::UnresolvedSymbol(symbol.to_string()))?;
        (function.native)(self, args)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut runtime = Runtime::capturing();
        let a = runtime.intern("hello");
        let b = runtime.intern("hello");
        assert_eq!(a, b);
        assert_eq!(runtime.read(a).unwrap(), "hello");
    }

    #[test]
    fn test_null_reads_as_empty() {
        let runtime = Runtime::capturing();
        assert_eq!(runtime.read(Pointer::Null).unwrap(), "");
    }

    #[test]
    fn test_captured_output() {
        let mut runtime = Runtime::capturing();
        runtime.write("a").unwrap();
        runtime.write("b").unwrap();
        assert_eq!(runtime.captured_output().as_deref(), Some("ab"));
    }

    #[test]
    fn test_call_unknown_symbol() {
        let mut runtime = Runtime::capturing();
        let result = runtime.call("basalt_nope", &[]);
        assert_eq!(result, Err(RuntimeError::UnresolvedSymbol("basalt_nope".to_string())));
    }
}
