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

//! Native runtime functions and their registry.

use super::{
    Pointer, Runtime, RuntimeError, Value, CONCAT, COPY_STRING, CREATE_STRING, FLOAT_TO_STRING,
    INT_TO_STRING, NATIVE_PREFIX, RELEASE_STRING,
};
use crate::ast::{ExternTable, FunctionArgument, FunctionSignature};
use crate::error::Span;
use crate::symbols::SymbolType;

/// Signature of a native implementation.
pub type NativeFn = fn(&mut Runtime, &[Value]) -> Result<Value, RuntimeError>;

/// A runtime-provided function.
///
/// `returns` is the declared result type. A pointer result alone does not
/// say whether the caller receives an owned string; a `String` here does.
#[derive(Clone, Copy)]
pub struct RuntimeFunction {
    pub name: &'static str,
    pub params: &'static [SymbolType],
    pub returns: SymbolType,
    pub native: NativeFn,
}

impl RuntimeFunction {
    /// Native symbol name.
    pub fn symbol(&self) -> String {
        format!("{}{}", NATIVE_PREFIX, self.name)
    }
}

use SymbolType::{Float as F, Int as I, String as S};

/// Every function the runtime exports.
pub const LIBRARY: &[RuntimeFunction] = &[
    RuntimeFunction { name: CREATE_STRING, params: &[S], returns: S, native: create_string },
    RuntimeFunction { name: COPY_STRING, params: &[S], returns: S, native: create_string },
    RuntimeFunction { name: INT_TO_STRING, params: &[I], returns: S, native: int_to_string },
    RuntimeFunction { name: FLOAT_TO_STRING, params: &[F], returns: S, native: float_to_string },
    RuntimeFunction { name: CONCAT, params: &[S, S], returns: S, native: concat },
    RuntimeFunction { name: RELEASE_STRING, params: &[S], returns: I, native: release_string },
    RuntimeFunction { name: "sin", params: &[F], returns: F, native: sin },
    RuntimeFunction { name: "cos", params: &[F], returns: F, native: cos },
    RuntimeFunction { name: "tan", params: &[F], returns: F, native: tan },
    RuntimeFunction { name: "sqr", params: &[F], returns: F, native: sqr },
    RuntimeFunction { name: "len", params: &[S], returns: I, native: len },
    RuntimeFunction { name: "print", params: &[S], returns: I, native: print },
    RuntimeFunction { name: "println", params: &[S], returns: I, native: println },
];

/// Find a runtime function by native symbol or plain name.
pub fn lookup(symbol: &str) -> Option<&'static RuntimeFunction> {
    let name = symbol.strip_prefix(NATIVE_PREFIX).unwrap_or(symbol);
    LIBRARY.iter().find(|function| function.name == name)
}

/// The runtime's functions as extern signatures, registered before parsing.
pub fn extern_table() -> ExternTable {
    LIBRARY
        .iter()
        .map(|function| {
            let arguments = function
                .params
                .iter()
                .enumerate()
                .map(|(i, ty)| FunctionArgument::new(format!("a{}", i), *ty, None, Span::default()))
                .collect();
            let signature = FunctionSignature::external(function.name, function.returns, arguments, Span::default());
            (function.name.to_string(), signature)
        })
        .collect()
}

fn pointer_arg(function: &str, args: &[Value], index: usize) -> Result<Pointer, RuntimeError> {
    match args.get(index) {
        Some(Value::Ptr(pointer)) => Ok(*pointer),
        _ => Err(RuntimeError::InvalidArgument {
            function: function.to_string(),
            expected: "string",
        }),
    }
}

fn int_arg(function: &str, args: &[Value], index: usize) -> Result<i32, RuntimeError> {
    match args.get(index) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(RuntimeError::InvalidArgument {
            function: function.to_string(),
            expected: "int",
        }),
    }
}

fn float_arg(function: &str, args: &[Value], index: usize) -> Result<f32, RuntimeError> {
    match args.get(index) {
        Some(Value::Float(n)) => Ok(*n),
        _ => Err(RuntimeError::InvalidArgument {
            function: function.to_string(),
            expected: "float",
        }),
    }
}

fn create_string(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = rt.read(pointer_arg(CREATE_STRING, args, 0)?)?.to_string();
    Ok(rt.alloc(text))
}

fn int_to_string(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let n = int_arg(INT_TO_STRING, args, 0)?;
    Ok(rt.alloc(n.to_string()))
}

fn float_to_string(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let n = float_arg(FLOAT_TO_STRING, args, 0)?;
    Ok(rt.alloc(format!("{:.6}", n)))
}

fn concat(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut text = rt.read(pointer_arg(CONCAT, args, 0)?)?.to_string();
    text.push_str(rt.read(pointer_arg(CONCAT, args, 1)?)?);
    Ok(rt.alloc(text))
}

fn release_string(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    rt.release(pointer_arg(RELEASE_STRING, args, 0)?)?;
    Ok(Value::Int(0))
}

fn sin(_: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg("sin", args, 0)?.sin()))
}

fn cos(_: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg("cos", args, 0)?.cos()))
}

fn tan(_: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg("tan", args, 0)?.tan()))
}

fn sqr(_: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg("sqr", args, 0)?.sqrt()))
}

fn len(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let count = rt.read(pointer_arg("len", args, 0)?)?.chars().count();
    Ok(Value::Int(count as i32))
}

fn print(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = rt.read(pointer_arg("print", args, 0)?)?.to_string();
    rt.write(&text)?;
    Ok(Value::Int(0))
}

fn println(rt: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut text = rt.read(pointer_arg("println", args, 0)?)?.to_string();
    text.push('\n');
    rt.write(&text)?;
    Ok(Value::Int(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(rt: &Runtime, value: Value) -> String {
        let Value::Ptr(pointer) = value else {
            panic!("Expected string pointer, got {:?}", value);
        };
        rt.read(pointer).unwrap().to_string()
    }

    #[test]
    fn test_lookup_by_symbol_and_name() {
        assert!(lookup("basalt_concat").is_some());
        assert!(lookup("sin").is_some());
        assert!(lookup("basalt_missing").is_none());
    }

    #[test]
    fn test_extern_table_contains_library() {
        let table = extern_table();
        assert_eq!(table.len(), LIBRARY.len());
        let concat = &table["concat"];
        assert!(concat.is_extern);
        assert_eq!(concat.return_type, SymbolType::String);
        assert_eq!(concat.total_count(), 2);
        assert_eq!(concat.symbol_name, "basalt_concat");
    }

    #[test]
    fn test_string_primitives() {
        let mut rt = Runtime::capturing();
        let raw = Value::Ptr(rt.intern("abc"));
        let owned = rt.call("basalt_create_string__", &[raw]).unwrap();
        let number = rt.call("basalt_int_to_string__", &[Value::Int(42)]).unwrap();
        let joined = rt.call("basalt_concat", &[owned, number]).unwrap();
        assert_eq!(text(&rt, joined), "abc42");
        assert_eq!(rt.heap().live(), 3);

        for value in [owned, number, joined] {
            rt.call("basalt_release_string__", &[value]).unwrap();
        }
        assert_eq!(rt.heap().live(), 0);
    }

    #[test]
    fn test_float_to_string_uses_six_digits() {
        let mut rt = Runtime::capturing();
        let value = rt.call("basalt_float_to_string__", &[Value::Float(1.5)]).unwrap();
        assert_eq!(text(&rt, value), "1.500000");
    }

    #[test]
    fn test_math() {
        let mut rt = Runtime::capturing();
        assert_eq!(rt.call("basalt_sqr", &[Value::Float(9.0)]).unwrap(), Value::Float(3.0));
        assert_eq!(rt.call("basalt_sin", &[Value::Float(0.0)]).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_println_and_len() {
        let mut rt = Runtime::capturing();
        let raw = Value::Ptr(rt.intern("héllo"));
        rt.call("basalt_println", &[raw]).unwrap();
        assert_eq!(rt.captured_output().as_deref(), Some("héllo\n"));
        assert_eq!(rt.call("basalt_len", &[raw]).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_wrong_argument_kind() {
        let mut rt = Runtime::capturing();
        let result = rt.call("basalt_sin", &[Value::Int(1)]);
        assert!(matches!(result, Err(RuntimeError::InvalidArgument { .. })));
    }
}
