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

//! String lifecycle tests.
//!
//! Checks the ownership bookkeeping of the code generator against the
//! release calls in the emitted IR and the heap counts of a real run.

use basalt::codegen::{CodeGenerator, LifecycleStats};
use basalt::ir::IrBuilder;
use basalt::runtime::{Runtime, NATIVE_PREFIX, RELEASE_STRING};
use basalt::{analyzer, vm, Module};
use pretty_assertions::assert_eq;

const PROGRAM: &str = "\
greeting$ = \"Hello\"

function shout$(text$)
  loud$ = text + \"!\"
  return loud + \"!\"
end function

function count%(text$, extra$ = \"??\")
  joined$ = text + extra
  return len(joined)
end function

function keep$(text$)
  return text
end function

println(shout(greeting))
println(count(\"abc\"))
println(keep(\"same\"))
";

fn lower(source: &str) -> (Module, Vec<LifecycleStats>) {
    let program = basalt::parse_source(source).expect("parse");
    let analysis = analyzer::analyze(&program).expect("analyze");
    let mut generator = CodeGenerator::new(IrBuilder::new(), &program, &analysis);
    generator.emit_program().expect("codegen");
    let stats = generator.lifecycle_stats().to_vec();
    let (module, _) = generator.finish();
    (module, stats)
}

fn stats<'a>(all: &'a [LifecycleStats], symbol: &str) -> &'a LifecycleStats {
    all.iter()
        .find(|s| s.symbol == symbol)
        .unwrap_or_else(|| panic!("no stats for {}", symbol))
}

fn release_symbol() -> String {
    format!("{}{}", NATIVE_PREFIX, RELEASE_STRING)
}

#[test]
fn test_string_function_keeps_exactly_its_result() {
    let (_, all) = lower(PROGRAM);
    let shout = stats(&all, "sshout_1_0");
    assert_eq!(shout.released, shout.registered - 1);
}

#[test]
fn test_int_function_releases_everything() {
    let (_, all) = lower(PROGRAM);
    let count = stats(&all, "icount_1_1");
    assert!(count.registered > 0);
    assert_eq!(count.released, count.registered);
}

#[test]
fn test_parameter_return_is_copied() {
    let (module, all) = lower(PROGRAM);
    let keep = stats(&all, "skeep_1_0");
    assert_eq!((keep.registered, keep.released), (1, 0));
    assert_eq!(module.count_calls("skeep_1_0", "basalt_copy_string__"), 1);
}

#[test]
fn test_release_calls_match_bookkeeping() {
    let (module, all) = lower(PROGRAM);
    for function in ["sshout_1_0", "icount_1_1", "skeep_1_0"] {
        assert_eq!(
            module.count_calls(function, &release_symbol()),
            stats(&all, function).released,
            "release calls in {}",
            function
        );
    }
}

#[test]
fn test_entry_releases_string_globals() {
    let (module, all) = lower(PROGRAM);
    let main = stats(&all, "__main");
    // One release for the global's previous value on store, one on exit.
    assert_eq!(module.count_calls("__main", &release_symbol()), main.released + 2);
}

#[test]
fn test_run_leaves_no_live_strings() {
    let compilation = basalt::compile(PROGRAM).expect("compile");
    let (code, runtime) = vm::execute(&compilation.module, Runtime::capturing()).expect("run");
    assert_eq!(code, 0);
    assert_eq!(runtime.captured_output().as_deref(), Some("Hello!!\n5\nsame\n"));
    assert_eq!(runtime.heap().allocated(), runtime.heap().released());
}
