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

//! Basalt Compiler Library
//!
//! This library provides all the components needed to compile Basalt source
//! code into a verified IR module and execute it.
//!
//! # Modules
//!
//! - [`error`] - Error types and error reporting
//! - [`lexer`] - Tokenization of source code
//! - [`parser`] - Parsing tokens into an AST with overload resolution
//! - [`ast`] - Abstract Syntax Tree definitions
//! - [`symbols`] - Types, symbol tables and overload matching
//! - [`analyzer`] - Semantic analysis and type checking
//! - [`codegen`] - Backend-neutral code generation and string lifecycles
//! - [`ir`] - The in-memory IR backend and its verifier
//! - [`runtime`] - String primitives and the native library
//! - [`vm`] - Execution of IR modules
//!
//! # Example
//!
//! ```no_run
//! use basalt::{analyzer, codegen, lexer, parser, vm, runtime::Runtime};
//!
//! fn run(source: &str) -> Result<i32, Box<dyn std::error::Error>> {
//!     // Tokenize
//!     let tokens = lexer::tokenize(source)?;
//!
//!     // Parse
//!     let program = parser::parse(&tokens).map_err(|errors| basalt::BuildError::Syntax(errors))?;
//!
//!     // Analyze
//!     let analysis = analyzer::analyze(&program).map_err(|errors| basalt::BuildError::Semantic(errors))?;
//!
//!     // Generate code
//!     let (module, _warnings) = codegen::generate(&program, &analysis)?;
//!
//!     // Execute
//!     let (code, _runtime) = vm::execute(&module, Runtime::new())?;
//!     Ok(code)
//! }
//! ```

pub mod analyzer;
pub mod ast;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod symbols;
pub mod vm;

use log::debug;

// Re-export commonly used types
pub use ast::Program;
pub use error::{
    format_error, format_warning, render_report, BuildError, CompileError, CompileWarning, ErrorCode, Result,
    SourceLocation, Span,
};
pub use ir::Module;
pub use lexer::Token;
pub use symbols::SymbolType;

/// The version of the Basalt compiler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the compiler.
pub const NAME: &str = "Basalt";

/// Output of a successful compilation.
#[derive(Debug)]
pub struct Compilation {
    /// The verified module.
    pub module: Module,
    /// Warnings from analysis and code generation, in that order.
    pub warnings: Vec<CompileWarning>,
}

/// Tokenize and parse `source`.
pub fn parse_source(source: &str) -> std::result::Result<Program, BuildError> {
    let tokens = lexer::tokenize(source).map_err(|error| BuildError::Syntax(vec![error]))?;
    debug!("scanned {} token(s)", tokens.len());
    parser::parse(&tokens).map_err(BuildError::Syntax)
}

/// Parse and analyze `source` without generating code.
///
/// Returns the analysis warnings on success.
pub fn check(source: &str) -> std::result::Result<Vec<CompileWarning>, BuildError> {
    let program = parse_source(source)?;
    let analysis = analyzer::analyze(&program).map_err(BuildError::Semantic)?;
    Ok(analysis.warnings)
}

/// Compile source code to a verified IR module.
///
/// This is the main entry point for compiling Basalt source code. It
/// performs all compilation stages: lexing, parsing, analysis, and code
/// generation. Code generation only runs when analysis reported no errors.
///
/// # Example
///
/// ```no_run
/// let source = "x% = 40 + 2\nprintln(x%)\n";
///
/// match basalt::compile(source) {
///     Ok(compilation) => println!("{}", compilation.module),
///     Err(e) => eprintln!("Compilation error: {}", e),
/// }
/// ```
pub fn compile(source: &str) -> std::result::Result<Compilation, BuildError> {
    let program = parse_source(source)?;
    let analysis = analyzer::analyze(&program).map_err(BuildError::Semantic)?;
    let mut warnings = analysis.warnings.clone();
    let (module, codegen_warnings) = codegen::generate(&program, &analysis).map_err(BuildError::Codegen)?;
    warnings.extend(codegen_warnings);
    Ok(Compilation { module, warnings })
}

/// Run a compiled module, printing to standard output.
pub fn run(module: &Module) -> std::result::Result<i32, runtime::RuntimeError> {
    vm::execute(module, runtime::Runtime::new()).map(|(code, _)| code)
}

/// Run a compiled module, returning its exit value and everything it printed.
pub fn run_captured(module: &Module) -> std::result::Result<(i32, String), runtime::RuntimeError> {
    let (code, runtime) = vm::execute(module, runtime::Runtime::capturing())?;
    Ok((code, runtime.captured_output().unwrap_or_default()))
}
