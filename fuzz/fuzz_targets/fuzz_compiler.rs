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

//! Fuzz target for the complete Basalt pipeline.
//!
//! Every program that compiles must verify and must run without leaking
//! heap strings; runtime errors other than leaks are acceptable.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_compiler -- -max_total_time=60

#![no_main]

use basalt::runtime::{Runtime, RuntimeError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        if let Ok(compilation) = basalt::compile(source) {
            assert_eq!(basalt::ir::verify_module(&compilation.module), Ok(()));
            let result = basalt::vm::execute(&compilation.module, Runtime::capturing());
            assert!(!matches!(result, Err(RuntimeError::LeakedStrings(_))));
        }
    }
});
