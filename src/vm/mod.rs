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

//! Execution engine for IR modules.
//!
//! Links every external declaration against the runtime library, then
//! interprets the entry function. Integer arithmetic wraps; integer
//! division by zero is a runtime error. After the entry function returns,
//! every heap string must have been released.

use log::{debug, trace};

use crate::ast::ENTRY_FUNCTION;
use crate::codegen::{ArithOp, Initializer};
use crate::ir::{Constant, FuncId, Function, Instr, Module, ValueId};
use crate::runtime::{self, Pointer, Runtime, RuntimeError, RuntimeFunction, Value};

/// Maximum nesting of calls before execution is aborted.
pub const MAX_CALL_DEPTH: usize = 512;

/// An interpreter bound to one module.
///
/// Calls between defined functions push a [`Frame`] onto an explicit
/// stack, so nesting depth is bounded by [`MAX_CALL_DEPTH`] and never by
/// the native stack.
pub struct Machine<'m> {
    module: &'m Module,
    runtime: Runtime,
    /// Runtime pointer of each string-pool entry.
    strings: Vec<Pointer>,
    globals: Vec<Value>,
    /// Native binding of each function, `None` for defined ones.
    natives: Vec<Option<&'static RuntimeFunction>>,
    frames: Vec<Frame<'m>>,
}

impl<'m> Machine<'m> {
    /// Link `module` against `runtime`.
    pub fn new(module: &'m Module, mut runtime: Runtime) -> Result<Self, RuntimeError> {
        let natives = module
            .functions
            .iter()
            .map(|function| {
                if !function.external {
                    return Ok(None);
                }
                runtime::lookup(&function.name)
                    .map(Some)
                    .ok_or_else(|| RuntimeError::UnresolvedSymbol(function.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let strings = module.strings.iter().map(|text| runtime.intern(text)).collect();
        let globals = module
            .globals
            .iter()
            .map(|global| match global.init {
                Initializer::Int(n) => Value::Int(n),
                Initializer::Float(n) => Value::Float(n),
                Initializer::Null => Value::Ptr(Pointer::Null),
            })
            .collect();

        debug!(
            "linked {} function(s), {} global(s), {} constant string(s)",
            module.functions.len(),
            module.globals.len(),
            module.strings.len()
        );

        Ok(Self {
            module,
            runtime,
            strings,
            globals,
            natives,
            frames: Vec::with_capacity(64),
        })
    }

    /// The runtime state.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Consume the machine, keeping the runtime state.
    pub fn into_runtime(self) -> Runtime {
        self.runtime
    }

    /// Execute the entry function and return its exit value.
    pub fn run(&mut self) -> Result<i32, RuntimeError> {
        let (entry, _) = self
            .module
            .function(ENTRY_FUNCTION)
            .ok_or_else(|| RuntimeError::MissingEntry(ENTRY_FUNCTION.to_string()))?;

        self.frames.clear();
        self.push_frame(entry, Vec::new(), None)?;
        let result = loop {
            if let Some(value) = self.step()? {
                break value;
            }
        };

        let Value::Int(code) = result else {
            return Err(RuntimeError::Malformed(format!(
                "entry function returned {:?}, expected an integer",
                result
            )));
        };

        let live = self.runtime.heap().live();
        if live > 0 {
            return Err(RuntimeError::LeakedStrings(live));
        }
        debug!(
            "program exited with {} after {} string allocation(s)",
            code,
            self.runtime.heap().allocated()
        );
        Ok(code)
    }

    /// Enter a defined function. `return_to` is the caller's destination value.
    fn push_frame(&mut self, id: FuncId, args: Vec<Value>, return_to: Option<ValueId>) -> Result<(), RuntimeError> {
        let module = self.module;
        let function = module
            .function_by_id(id)
            .ok_or_else(|| RuntimeError::Malformed(format!("unknown function #{}", id.0)))?;
        if args.len() != function.params.len() {
            return Err(RuntimeError::Malformed(format!(
                "'{}' called with {} argument(s), expected {}",
                function.name,
                args.len(),
                function.params.len()
            )));
        }
        if function.blocks.is_empty() {
            return Err(RuntimeError::Malformed(format!("'{}' has no body", function.name)));
        }

        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow(MAX_CALL_DEPTH));
        }
        self.frames.push(Frame::new(function, args, return_to));
        trace!("enter {} (depth {})", function.name, self.frames.len());
        Ok(())
    }

    /// Call `callee`, writing its result to `dest` of the current frame.
    fn call(&mut self, callee: FuncId, args: Vec<Value>, dest: ValueId) -> Result<(), RuntimeError> {
        let Some(native) = self.natives.get(callee.0 as usize).copied().flatten() else {
            return self.push_frame(callee, args, Some(dest));
        };
        trace!("native call {}", native.name);
        let result = (native.native)(&mut self.runtime, &args)?;
        self.current()?.set(dest, result);
        Ok(())
    }

    fn current(&mut self) -> Result<&mut Frame<'m>, RuntimeError> {
        self.frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Malformed("no active call frame".to_string()))
    }

    /// Execute one instruction. Returns the entry function's result once it returns.
    fn step(&mut self) -> Result<Option<Value>, RuntimeError> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Malformed("no active call frame".to_string()))?;
        let function = frame.function;
        let Some(instr) = function.blocks.first().and_then(|block| block.instrs.get(frame.ip)) else {
            return Err(RuntimeError::Malformed(format!(
                "'{}' ended without returning",
                function.name
            )));
        };
        frame.ip += 1;

        match instr {
            Instr::Const { dest, value } => {
                let value = match value {
                    Constant::Int(n) => Value::Int(*n),
                    Constant::Float(n) => Value::Float(*n),
                    Constant::Null => Value::Ptr(Pointer::Null),
                    Constant::Str(index) => Value::Ptr(
                        self.strings
                            .get(*index as usize)
                            .copied()
                            .ok_or(RuntimeError::InvalidPointer)?,
                    ),
                };
                frame.set(*dest, value);
            }
            Instr::IntArith { dest, op, left, right } => {
                let result = int_arith(*op, frame.int(*left)?, frame.int(*right)?)?;
                frame.set(*dest, Value::Int(result));
            }
            Instr::FloatArith { dest, op, left, right } => {
                let (a, b) = (frame.float(*left)?, frame.float(*right)?);
                let result = match op {
                    ArithOp::Add => a + b,
                    ArithOp::Sub => a - b,
                    ArithOp::Mul => a * b,
                    ArithOp::Div => a / b,
                };
                frame.set(*dest, Value::Float(result));
            }
            Instr::IntToFloat { dest, value } => {
                let value = frame.int(*value)? as f32;
                frame.set(*dest, Value::Float(value));
            }
            Instr::FloatToInt { dest, value } => {
                let value = frame.float(*value)? as i32;
                frame.set(*dest, Value::Int(value));
            }
            Instr::IntEq { dest, left, right } => {
                let equal = frame.int(*left)? == frame.int(*right)?;
                frame.set(*dest, Value::Int(equal as i32));
            }
            Instr::FloatEq { dest, left, right } => {
                let equal = frame.float(*left)? == frame.float(*right)?;
                frame.set(*dest, Value::Int(equal as i32));
            }
            Instr::Load { dest, global } => {
                let value = self
                    .globals
                    .get(global.0 as usize)
                    .copied()
                    .ok_or_else(|| RuntimeError::Malformed(format!("unknown global #{}", global.0)))?;
                frame.set(*dest, value);
            }
            Instr::Store { global, value } => {
                let value = frame.get(*value)?;
                let slot = self
                    .globals
                    .get_mut(global.0 as usize)
                    .ok_or_else(|| RuntimeError::Malformed(format!("unknown global #{}", global.0)))?;
                *slot = value;
            }
            Instr::Call { dest, callee, args } => {
                let args = args.iter().map(|arg| frame.get(*arg)).collect::<Result<Vec<_>, _>>()?;
                self.call(*callee, args, *dest)?;
            }
            Instr::Ret { value } => {
                let value = frame.get(*value)?;
                let return_to = frame.return_to;
                self.frames.pop();
                trace!("leave {} (depth {})", function.name, self.frames.len());
                let Some(caller) = self.frames.last_mut() else {
                    return Ok(Some(value));
                };
                let dest = return_to.ok_or_else(|| {
                    RuntimeError::Malformed(format!("'{}' returned to a caller without a destination", function.name))
                })?;
                caller.set(dest, value);
            }
        }
        Ok(None)
    }
}

fn int_arith(op: ArithOp, a: i32, b: i32) -> Result<i32, RuntimeError> {
    Ok(match op {
        ArithOp::Add => a.wrapping_add(b),
        ArithOp::Sub => a.wrapping_sub(b),
        ArithOp::Mul => a.wrapping_mul(b),
        ArithOp::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
    })
}

/// Values and position of one activation.
struct Frame<'f> {
    function: &'f Function,
    values: Vec<Option<Value>>,
    /// Index of the next instruction in the entry block.
    ip: usize,
    /// Caller value receiving the result; `None` for the entry function.
    return_to: Option<ValueId>,
}

impl<'f> Frame<'f> {
    fn new(function: &'f Function, args: Vec<Value>, return_to: Option<ValueId>) -> Self {
        let mut values: Vec<Option<Value>> = args.into_iter().map(Some).collect();
        values.resize(function.value_types.len(), None);
        Self {
            function,
            values,
            ip: 0,
            return_to,
        }
    }

    fn set(&mut self, id: ValueId, value: Value) {
        let index = id.0 as usize;
        if index >= self.values.len() {
            self.values.resize(index + 1, None);
        }
        self.values[index] = Some(value);
    }

    fn get(&self, id: ValueId) -> Result<Value, RuntimeError> {
        self.values.get(id.0 as usize).copied().flatten().ok_or_else(|| {
            RuntimeError::Malformed(format!("{} read before definition in '{}'", id, self.function.name))
        })
    }

    fn int(&self, id: ValueId) -> Result<i32, RuntimeError> {
        match self.get(id)? {
            Value::Int(n) => Ok(n),
            other => Err(self.mismatch(id, "i32", other)),
        }
    }

    fn float(&self, id: ValueId) -> Result<f32, RuntimeError> {
        match self.get(id)? {
            Value::Float(n) => Ok(n),
            other => Err(self.mismatch(id, "f32", other)),
        }
    }

    fn mismatch(&self, id: ValueId, expected: &str, found: Value) -> RuntimeError {
        RuntimeError::Malformed(format!(
            "{} in '{}' holds {:?}, expected {}",
            id, self.function.name, found, expected
        ))
    }
}

/// Execute `module` on `runtime`, returning the exit value and the runtime.
pub fn execute(module: &Module, runtime: Runtime) -> Result<(i32, Runtime), RuntimeError> {
    let mut machine = Machine::new(module, runtime)?;
    let code = machine.run()?;
    Ok((code, machine.into_runtime()))
}
