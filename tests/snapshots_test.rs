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

//! Snapshot tests for the Basalt compiler.
//!
//! These tests use the `insta` crate to capture the IR listings produced
//! for small programs.

use basalt::{lexer, Span, Token};
use insta::assert_snapshot;

fn listing(source: &str) -> String {
    let compilation = basalt::compile(source).unwrap_or_else(|e| panic!("compile failed: {:?}", e.errors()));
    compilation.module.to_string().trim().to_string()
}

/// Format tokens for snapshot comparison.
fn format_tokens(tokens: &[(Token, Span)]) -> String {
    let mut output = String::new();
    for (token, span) in tokens {
        output.push_str(&format!("{:?} @ {}..{}\n", token, span.start, span.end));
    }
    output.trim_end().to_string()
}

// ============================================================================
// Lexer Snapshot Tests
// ============================================================================

#[test]
fn test_lexer_snapshot_assignment() {
    let tokens = lexer::tokenize("x# = 1.5 : ; note\n").unwrap();
    assert_snapshot!(format_tokens(&tokens), @r###"
    Identifier("x") @ 0..1
    FloatMarker @ 1..2
    Equal @ 3..4
    Float(1.5) @ 5..8
    EndOfStatement @ 9..10
    EndOfStatement @ 17..18
    "###);
}

// ============================================================================
// IR Snapshot Tests
// ============================================================================

#[test]
fn test_ir_integer_function() {
    assert_snapshot!(listing("function add%(a%, b%)\n  return a + b\nend function\n"), @r###"
    define i32 @iadd_2_0(i32 %0, i32 %1) {
    entry:
      %2 = add i32 %0, %1
      ret i32 %2
    }

    define i32 @__main() {
    entry:
      %0 = const i32 0
      ret i32 %0
    }
    "###);
}

#[test]
fn test_ir_widening_before_operation() {
    assert_snapshot!(listing("function half#(n%)\n  return n / 2.0\nend function\n"), @r###"
    define f32 @fhalf_1_0(i32 %0) {
    entry:
      %1 = const f32 2.0
      %2 = sitofp %0
      %3 = fdiv f32 %2, %1
      ret f32 %3
    }

    define i32 @__main() {
    entry:
      %0 = const i32 0
      ret i32 %0
    }
    "###);
}

#[test]
fn test_ir_string_global_lifecycle() {
    assert_snapshot!(listing("name$ = \"Ann\"\nprintln(name)\n"), @r###"
    global @name: ptr = null
    declare ptr @basalt_create_string__(ptr)
    declare ptr @basalt_copy_string__(ptr)
    declare i32 @basalt_release_string__(ptr)
    declare i32 @basalt_println(ptr)

    define i32 @__main() {
    entry:
      %0 = const ptr "Ann"
      %1 = call ptr @basalt_create_string__(%0)
      %2 = call ptr @basalt_copy_string__(%1)
      %3 = load ptr @name
      %4 = call i32 @basalt_release_string__(%3)
      store @name, %2
      %5 = load ptr @name
      %6 = call ptr @basalt_copy_string__(%5)
      %7 = call i32 @basalt_println(%6)
      %8 = const i32 0
      %9 = call i32 @basalt_release_string__(%6)
      %10 = call i32 @basalt_release_string__(%1)
      %11 = load ptr @name
      %12 = call i32 @basalt_release_string__(%11)
      %13 = const ptr null
      store @name, %13
      ret i32 %8
    }
    "###);
}
