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

//! End-to-end CLI integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_basalt"))
}

/// Write `source` into a fresh temporary directory.
fn source_file(source: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("program.bas");
    std::fs::write(&path, source).expect("Failed to write source");
    (dir, path)
}

fn run_with(source: &str, args: &[&str]) -> Output {
    let (_dir, path) = source_file(source);
    cargo_bin()
        .arg(&path)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Test --help flag.
#[test]
fn test_help_flag() {
    let output = cargo_bin().arg("--help").output().expect("Failed to execute command");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("basalt") || text.contains("Basalt"));
    assert!(text.contains("--emit-ir"));
    assert!(text.contains("--check"));
}

/// Test --version flag.
#[test]
fn test_version_flag() {
    let output = cargo_bin().arg("--version").output().expect("Failed to execute command");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("basalt"));
    assert!(text.contains("0.1.0"));
}

#[test]
fn test_runs_program() {
    let output = run_with("println(\"Hello\")\n", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hello\n");
}

#[test]
fn test_exit_code_is_program_result() {
    let output = run_with("return 3\n", &[]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_check_mode() {
    let output = run_with("println(\"never printed\")\n", &["--check"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("program.bas: ok"));
    assert!(!text.contains("never printed"));
}

#[test]
fn test_emit_ir_without_running() {
    let output = run_with("x = 1\n", &["--emit-ir", "--no-run"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("global @x: i32 = 0"));
    assert!(text.contains("define i32 @__main()"));
}

#[test]
fn test_ir_written_to_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("prog.bas");
    let listing = dir.path().join("prog.ir");
    std::fs::write(&source, "println(\"side effect\")\n").unwrap();

    let output = cargo_bin()
        .arg(&source)
        .arg("-o")
        .arg(&listing)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "side effect\n");
    let written = std::fs::read_to_string(&listing).expect("listing written");
    assert!(written.contains("@basalt_println"));
}

#[test]
fn test_compile_error_exit_code() {
    let output = run_with("x% = \"a\"\n", &[]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("E210"), "stderr: {}", text);
    assert!(text.contains("program.bas:1:"), "stderr: {}", text);
}

#[test]
fn test_every_syntax_error_is_reported() {
    let output = run_with("a = (1\nb = * 2\n", &[]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("E132"), "stderr: {}", text);
    assert!(text.contains("E103"), "stderr: {}", text);
}

#[test]
fn test_warnings_do_not_stop_execution() {
    let output = run_with("n% = 2.5\nprintln(n)\n", &[]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("W001"));
    assert_eq!(stdout(&output), "2\n");
}

#[test]
fn test_runtime_error_exit_code() {
    let output = run_with("z = 0\nprintln(1 / z)\n", &[]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("division by zero"));
}

#[test]
fn test_missing_file_exit_code() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = cargo_bin()
        .arg(dir.path().join("missing.bas"))
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(2));
}
