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

//! Basalt Compiler CLI
//!
//! Compiles a Basalt source file to a verified IR module and runs it.

use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

use basalt::error::{format_error, format_warning, render_report, BuildError, CompileError};

/// Basalt - A small typed scripting language
#[derive(Parser, Debug)]
#[command(name = "basalt")]
#[command(author = "Basalt Team")]
#[command(version)]
#[command(about = "A small typed scripting language with a verifying IR backend")]
#[command(long_about = r#"
Basalt compiles a source file into a typed, verified intermediate
representation and executes it. The program's result becomes the exit
code.

Example usage:
  basalt hello.bas
  basalt hello.bas --check
  basalt hello.bas --emit-ir --no-run
  basalt hello.bas --emit-ir -o hello.ir

Logging is controlled with RUST_LOG (default: warn).
"#)]
struct Cli {
    /// Source file to compile (.bas)
    source_file: PathBuf,

    /// Only parse and type check, do not generate code
    #[arg(long)]
    check: bool,

    /// Print the IR listing
    #[arg(long)]
    emit_ir: bool,

    /// Write the IR listing to a file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compile without running the program
    #[arg(long)]
    no_run: bool,

    /// Render diagnostics as colored reports
    #[arg(long)]
    color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn render_error(&self, error: &CompileError, source: &str, filename: &str) -> String {
        if self.color {
            render_report(error, source, filename, true)
        } else {
            format_error(error, source, Some(filename))
        }
    }

    fn report(&self, failure: &BuildError, source: &str, filename: &str) {
        for error in failure.errors() {
            eprint!("{}", self.render_error(error, source, filename));
        }
        eprintln!("error: {}", failure);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    info!("{} v{}", basalt::NAME, basalt::VERSION);

    let source = match std::fs::read_to_string(&cli.source_file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: Cannot read {}: {}", cli.source_file.display(), e);
            return ExitCode::from(2);
        }
    };

    let filename = cli
        .source_file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("<input>")
        .to_string();

    if cli.check {
        return match basalt::check(&source) {
            Ok(warnings) => {
                for warning in &warnings {
                    eprint!("{}", format_warning(warning, &source, Some(&filename)));
                }
                println!("{}: ok", filename);
                ExitCode::SUCCESS
            }
            Err(failure) => {
                cli.report(&failure, &source, &filename);
                ExitCode::from(1)
            }
        };
    }

    let compilation = match basalt::compile(&source) {
        Ok(compilation) => compilation,
        Err(failure) => {
            cli.report(&failure, &source, &filename);
            return ExitCode::from(1);
        }
    };

    // Warnings don't prevent execution
    for warning in &compilation.warnings {
        eprint!("{}", format_warning(warning, &source, Some(&filename)));
    }

    debug!(
        "compiled {} into {} function(s)",
        filename,
        compilation.module.functions.len()
    );

    if cli.emit_ir || cli.output.is_some() {
        let listing = compilation.module.to_string();
        match &cli.output {
            Some(path) => {
                if let Err(e) = std::fs::write(path, &listing) {
                    eprintln!("Error: Cannot write {}: {}", path.display(), e);
                    return ExitCode::from(2);
                }
                if cli.verbose {
                    println!("Wrote {}", path.display());
                }
            }
            None => print!("{}", listing),
        }
    }

    if cli.no_run {
        return ExitCode::SUCCESS;
    }

    match basalt::run(&compilation.module) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("runtime error: {}", e);
            ExitCode::from(3)
        }
    }
}
