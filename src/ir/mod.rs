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

//! In-memory intermediate representation.
//!
//! A typed, SSA-style IR with one value namespace per function. This is
//! the concrete target of the code generator and the input of the
//! execution engine.
//!
//! # Module Structure
//!
//! - `builder` - The [`IrBuilder`], implementing the codegen backend
//! - `instr` - Instructions
//! - `module` - Modules, functions, blocks and the textual listing
//! - `types` - Handles and constants
//! - `verify` - The structural verifier

mod builder;
mod instr;
mod module;
mod types;
mod verify;

pub use builder::IrBuilder;
pub use instr::Instr;
pub use module::{Block, Function, Global, Module};
pub use types::{BlockId, Constant, FuncId, GlobalId, ValueId};
pub use verify::{verify, verify_module, VerifyError};
