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

//! End-to-end execution tests for the Basalt compiler.
//!
//! These tests compile programs, run them on the VM with captured output
//! and check what they print and return.

use basalt::runtime::{RuntimeError, Runtime};
use basalt::vm::{self, MAX_CALL_DEPTH};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// Compile and run, returning the exit value and the output.
fn run(source: &str) -> (i32, String) {
    let compilation = basalt::compile(source).unwrap_or_else(|e| panic!("compile failed: {:?}", e.errors()));
    basalt::run_captured(&compilation.module).unwrap_or_else(|e| panic!("runtime error: {}", e))
}

fn output(source: &str) -> String {
    run(source).1
}

fn runtime_error(source: &str) -> RuntimeError {
    let compilation = basalt::compile(source).expect("compile");
    basalt::run_captured(&compilation.module).expect_err("expected a runtime error")
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test_case("println(2 + 3 * 4)", "14\n"; "precedence")]
#[test_case("println((2 + 3) * 4)", "20\n"; "parentheses")]
#[test_case("println(10 - 4 - 3)", "3\n"; "left_associative")]
#[test_case("println(7 / 2)", "3\n"; "integer_division_truncates")]
#[test_case("println(-7 / 2)", "-3\n"; "negative_division_truncates")]
#[test_case("println(7 / 2.0)", "3.500000\n"; "mixed_division_widens")]
#[test_case("println(1.5 + 1)", "2.500000\n"; "float_plus_int")]
#[test_case("println(-(2 - 5))", "3\n"; "negate_parenthesized")]
#[test_case("println(not 0)", "1\n"; "not_zero")]
#[test_case("println(!5)", "0\n"; "bang_nonzero")]
#[test_case("println(not 0.0)", "1\n"; "not_float")]
#[test_case("println(2147483647 + 1)", "-2147483648\n"; "overflow_wraps")]
fn test_arithmetic(source: &str, expected: &str) {
    assert_eq!(output(source), expected);
}

// ============================================================================
// Variables and Conversions
// ============================================================================

#[test]
fn test_assignment_declares_int() {
    assert_eq!(output("x = 7 / 2\nprintln(x)\n"), "3\n");
}

#[test]
fn test_float_variable() {
    assert_eq!(output("y# = 7 / 2\nprintln(y)\n"), "3.000000\n");
}

#[test]
fn test_narrowing_truncates() {
    let compilation = basalt::compile("n% = 2.9\nprintln(n)\n").expect("compile");
    assert_eq!(compilation.warnings.len(), 1);
    let (_, printed) = basalt::run_captured(&compilation.module).expect("run");
    assert_eq!(printed, "2\n");
}

#[test]
fn test_number_assigned_to_string() {
    assert_eq!(output("s$ = 42\nprintln(s)\n"), "42\n");
}

#[test]
fn test_chained_assignment() {
    assert_eq!(output("a = b = 5\nprintln(a + b)\n"), "10\n");
}

#[test]
fn test_identifiers_are_case_insensitive() {
    assert_eq!(output("Total = 3\nprintln(TOTAL)\n"), "3\n");
}

#[test]
fn test_colon_separates_statements() {
    assert_eq!(output("a = 1 : b = 2 : println(a + b)\n"), "3\n");
}

#[test]
fn test_comments_are_ignored() {
    assert_eq!(output("; setup\nx = 1 ; one\nprintln(x)\n"), "1\n");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_concatenation() {
    assert_eq!(output("name$ = \"World\"\nprintln(\"Hello, \" + name + \"!\")\n"), "Hello, World!\n");
}

#[test]
fn test_string_plus_number() {
    assert_eq!(output("println(\"n = \" + 5)\n"), "n = 5\n");
}

#[test]
fn test_string_global_reassignment() {
    assert_eq!(output("s$ = \"a\"\ns = s + \"b\"\ns = s + \"c\"\nprintln(s)\n"), "abc\n");
}

#[test]
fn test_print_without_newline() {
    assert_eq!(output("print(\"a\")\nprint(\"b\")\n"), "ab");
}

#[test]
fn test_call_first_statement() {
    assert_eq!(output("println \"hi\"\n"), "hi\n");
}

#[test]
fn test_len() {
    assert_eq!(output("println(len(\"hello\"))\n"), "5\n");
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_with_default() {
    let source = "function add%(a%, b% = 10)\n  return a + b\nend function\nprintln(add(1))\nprintln(add(1, 2))\n";
    assert_eq!(output(source), "11\n3\n");
}

#[test]
fn test_overloads_by_arity() {
    let source = "function f%(a%)\n  return 1\nend function\n\
                  function f%(a%, b%)\n  return 2\nend function\n\
                  println(f(9))\nprintln(f(9, 9))\n";
    assert_eq!(output(source), "1\n2\n");
}

#[test]
fn test_string_function() {
    let source = "function greet$(name$)\n  prefix$ = \"Hello, \"\n  return prefix + name + \"!\"\nend function\nprintln(greet(\"Ann\"))\n";
    assert_eq!(output(source), "Hello, Ann!\n");
}

#[test]
fn test_string_parameter_returned() {
    let source = "function id$(s$)\n  return s\nend function\nprintln(id(\"same\"))\n";
    assert_eq!(output(source), "same\n");
}

#[test]
fn test_string_function_fall_through_returns_empty() {
    let source = "function nothing$()\n  x = 1\nend function\nprintln(\"[\" + nothing() + \"]\")\n";
    assert_eq!(output(source), "[]\n");
}

#[test]
fn test_function_updates_global() {
    let source = "x = 1\nfunction f()\n  x = 5\nend function\nf()\nprintln(x)\n";
    assert_eq!(output(source), "5\n");
}

#[test]
fn test_function_locals_are_fresh_per_call() {
    let source = "function f%()\n  n% = n + 1\n  return n\nend function\nprintln(f())\nprintln(f())\n";
    assert_eq!(output(source), "1\n1\n");
}

#[test]
fn test_library_math() {
    assert_eq!(output("println(sqr(16))\n"), "4.000000\n");
}

#[test]
fn test_keywords_are_case_insensitive() {
    let source = "FUNCTION Seven%()\n  RETURN 7\nEND FUNCTION\nprintln(seven())\n";
    assert_eq!(output(source), "7\n");
}

// ============================================================================
// Exit Values and Runtime Errors
// ============================================================================

#[test]
fn test_exit_value_defaults_to_zero() {
    assert_eq!(run("x = 1\n").0, 0);
}

#[test]
fn test_top_level_return_sets_exit_value() {
    assert_eq!(run("println(\"bye\")\nreturn 7\n"), (7, "bye\n".to_string()));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(runtime_error("x = 0\ny = 1 / x\n"), RuntimeError::DivisionByZero);
}

#[test]
fn test_unbounded_recursion() {
    let source = "function f%()\n  return f()\nend function\nf()\n";
    assert_eq!(runtime_error(source), RuntimeError::StackOverflow(MAX_CALL_DEPTH));
}

#[test]
fn test_no_strings_survive_a_run() {
    let source = "function twice$(s$)\n  return s + s\nend function\n\
                  g$ = twice(\"ab\")\ng = g + twice(\"c\")\nprintln(g)\n";
    let compilation = basalt::compile(source).expect("compile");
    let (code, runtime) = vm::execute(&compilation.module, Runtime::capturing()).expect("run");
    assert_eq!(code, 0);
    assert_eq!(runtime.captured_output().as_deref(), Some("ababcc\n"));
    assert_eq!(runtime.heap().live(), 0);
    assert!(runtime.heap().allocated() > 0);
}
