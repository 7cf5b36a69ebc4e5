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

//! Error types for the Basalt compiler.
//!
//! Diagnostics come in three disjoint kinds: syntax errors (scanning and
//! parsing), type errors (semantic analysis) and codegen errors. Every
//! [`ErrorCode`] belongs to exactly one [`ErrorKind`]; the pipeline keeps
//! them apart in [`BuildError`]. Warnings never block a phase.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// A source span representing a range in the source code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span from a range.
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// Get the length of this span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::from_range(range)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// The phase family an error code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Scanning and parsing.
    Syntax,
    /// Semantic analysis.
    Type,
    /// Code generation.
    Codegen,
}

/// Error codes for the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexical errors (E001-E099)
    InvalidCharacter,
    UnterminatedString,
    IntegerTooLarge,
    InvalidNumber,

    // Syntax errors (E100-E199)
    UnexpectedToken,
    UnexpectedEndOfFile,
    ExpectedExpression,
    ExpectedIdentifier,
    ExpectedFunctionName,
    ExpectedOpenParen,
    ExpectedCloseParen,
    MalformedSignature,
    DuplicateSignature,
    DuplicateParameterName,
    NestedDefinition,
    ExpectedFunctionAfterEnd,
    MissingEndFunction,
    DefaultOnExternArgument,
    RedeclaredWithDifferentType,

    // Semantic errors (E200-E299)
    UndefinedVariable,
    TypeMismatch,
    InvalidOperatorForType,
    InvalidAssignmentTarget,
    UndefinedFunction,
    ArgumentTypeMismatch,
    ReturnTypeMismatch,
    ReturnNotAtStatementStart,
    ConstantExpressionRequired,

    // Codegen errors (E300-E399)
    NoConversionLowering,
    UnknownVariable,
    UnresolvedCallTarget,
    InvalidEmissionState,
    VerificationFailed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::InvalidCharacter => "E001",
            ErrorCode::UnterminatedString => "E010",
            ErrorCode::IntegerTooLarge => "E020",
            ErrorCode::InvalidNumber => "E021",

            // Syntax errors
            ErrorCode::UnexpectedToken => "E100",
            ErrorCode::UnexpectedEndOfFile => "E101",
            ErrorCode::ExpectedExpression => "E103",
            ErrorCode::ExpectedIdentifier => "E105",
            ErrorCode::ExpectedFunctionName => "E130",
            ErrorCode::ExpectedOpenParen => "E131",
            ErrorCode::ExpectedCloseParen => "E132",
            ErrorCode::MalformedSignature => "E133",
            ErrorCode::DuplicateSignature => "E134",
            ErrorCode::DuplicateParameterName => "E135",
            ErrorCode::NestedDefinition => "E136",
            ErrorCode::ExpectedFunctionAfterEnd => "E137",
            ErrorCode::MissingEndFunction => "E138",
            ErrorCode::DefaultOnExternArgument => "E139",
            ErrorCode::RedeclaredWithDifferentType => "E140",

            // Semantic errors
            ErrorCode::UndefinedVariable => "E200",
            ErrorCode::TypeMismatch => "E210",
            ErrorCode::InvalidOperatorForType => "E212",
            ErrorCode::InvalidAssignmentTarget => "E213",
            ErrorCode::UndefinedFunction => "E220",
            ErrorCode::ArgumentTypeMismatch => "E223",
            ErrorCode::ReturnTypeMismatch => "E224",
            ErrorCode::ReturnNotAtStatementStart => "E225",
            ErrorCode::ConstantExpressionRequired => "E230",

            // Codegen errors
            ErrorCode::NoConversionLowering => "E300",
            ErrorCode::UnknownVariable => "E301",
            ErrorCode::UnresolvedCallTarget => "E302",
            ErrorCode::InvalidEmissionState => "E303",
            ErrorCode::VerificationFailed => "E304",
        }
    }

    /// The phase family this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self.code().as_bytes()[1] {
            b'0' | b'1' => ErrorKind::Syntax,
            b'2' => ErrorKind::Type,
            _ => ErrorKind::Codegen,
        }
    }
}

/// A compiler error with source location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {message}")]
pub struct CompileError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// The source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl CompileError {
    /// Create a new compile error.
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to this error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the error code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the phase family of this error.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Warning codes for the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// Float value narrowed into an Int slot.
    PrecisionLoss,
    /// Statements following a `return` were skipped.
    UnreachableCode,
}

impl WarningCode {
    /// Get the numeric code for this warning.
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::PrecisionLoss => "W001",
            WarningCode::UnreachableCode => "W002",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A compiler warning. Never blocks compilation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {message}")]
pub struct CompileWarning {
    /// The warning code.
    pub code: WarningCode,
    /// The warning message.
    pub message: String,
    /// The source span the warning refers to.
    pub span: Span,
}

impl CompileWarning {
    /// Create a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    /// Get the warning code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }
}

/// Failure of one compilation pipeline phase.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Scanning or parsing failed.
    #[error("parsing failed with {} error(s)", .0.len())]
    Syntax(Vec<CompileError>),
    /// Semantic analysis reported errors; code generation was not attempted.
    #[error("semantic analysis failed with {} error(s)", .0.len())]
    Semantic(Vec<CompileError>),
    /// Code generation failed.
    #[error("code generation failed: {0}")]
    Codegen(CompileError),
}

impl BuildError {
    /// All errors carried by this failure.
    pub fn errors(&self) -> &[CompileError] {
        match self {
            BuildError::Syntax(errors) | BuildError::Semantic(errors) => errors,
            BuildError::Codegen(error) => std::slice::from_ref(error),
        }
    }
}

/// Source location with line and column information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// The content of the line.
    pub line_content: String,
}

impl SourceLocation {
    /// Calculate line and column from a byte offset in source code.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];

        let line = before.chars().filter(|&c| c == '\n').count() + 1;

        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;

        let line_end = source[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(source.len());
        let line_content = source[line_start..line_end].to_string();

        Self {
            line,
            column,
            line_content,
        }
    }
}

fn format_diagnostic(
    severity: &str,
    code: &str,
    message: &str,
    span: &Span,
    hint: Option<&str>,
    source: &str,
    filename: Option<&str>,
) -> String {
    let loc = SourceLocation::from_offset(source, span.start);
    let filename = filename.unwrap_or("<input>");

    let mut output = String::new();

    output.push_str(&format!("{}[{}]: {}\n", severity, code, message));
    output.push_str(&format!("  --> {}:{}:{}\n", filename, loc.line, loc.column));

    let line_num_width = loc.line.to_string().len();
    output.push_str(&format!("{:>width$} |\n", "", width = line_num_width));
    output.push_str(&format!(
        "{:>width$} | {}\n",
        loc.line,
        loc.line_content,
        width = line_num_width
    ));

    let underline_start = loc.column - 1;
    let underline_len = span
        .len()
        .max(1)
        .min(loc.line_content.len().saturating_sub(underline_start).max(1));
    output.push_str(&format!(
        "{:>width$} | {:>start$}{}\n",
        "",
        "",
        "^".repeat(underline_len),
        width = line_num_width,
        start = underline_start
    ));

    if let Some(hint) = hint {
        output.push_str(&format!(
            "{:>width$} = hint: {}\n",
            "",
            hint,
            width = line_num_width
        ));
    }

    output
}

/// Format an error with source context.
pub fn format_error(error: &CompileError, source: &str, filename: Option<&str>) -> String {
    format_diagnostic(
        "error",
        error.code_str(),
        &error.message,
        &error.span,
        error.hint.as_deref(),
        source,
        filename,
    )
}

/// Format a warning with source context.
pub fn format_warning(warning: &CompileWarning, source: &str, filename: Option<&str>) -> String {
    format_diagnostic(
        "warning",
        warning.code_str(),
        &warning.message,
        &warning.span,
        None,
        source,
        filename,
    )
}

/// Render an error as an `ariadne` report.
///
/// Falls back to [`format_error`] if the report cannot be written.
pub fn render_report(error: &CompileError, source: &str, filename: &str, color: bool) -> String {
    let range: Range<usize> = error.span.clone().into();
    let mut builder = Report::build(ReportKind::Error, filename, error.span.start)
        .with_config(Config::default().with_color(color))
        .with_code(error.code_str())
        .with_message(&error.message)
        .with_label(Label::new((filename, range)).with_message(&error.message));
    if let Some(hint) = &error.hint {
        builder = builder.with_help(hint);
    }

    let mut buffer = Vec::new();
    match builder
        .finish()
        .write((filename, Source::from(source)), &mut buffer)
    {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        Err(_) => format_error(error, source, Some(filename)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_creation() {
        let span = Span::new(10, 20);
        assert_eq!(span.start, 10);
        assert_eq!(span.end, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_merge() {
        let span1 = Span::new(5, 10);
        let span2 = Span::new(15, 20);
        let merged = span1.merge(&span2);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
    }

    #[test]
    fn test_error_code() {
        assert_eq!(ErrorCode::InvalidCharacter.code(), "E001");
        assert_eq!(ErrorCode::UnexpectedToken.code(), "E100");
        assert_eq!(ErrorCode::UndefinedVariable.code(), "E200");
        assert_eq!(ErrorCode::VerificationFailed.code(), "E304");
    }

    #[test]
    fn test_error_kinds_are_disjoint() {
        assert_eq!(ErrorCode::UnterminatedString.kind(), ErrorKind::Syntax);
        assert_eq!(ErrorCode::DuplicateSignature.kind(), ErrorKind::Syntax);
        assert_eq!(ErrorCode::TypeMismatch.kind(), ErrorKind::Type);
        assert_eq!(ErrorCode::NoConversionLowering.kind(), ErrorKind::Codegen);
    }

    #[test]
    fn test_compile_error() {
        let error = CompileError::new(
            ErrorCode::UndefinedVariable,
            "Undefined variable 'foo'",
            Span::new(0, 3),
        )
        .with_hint("Declare it with a type marker, e.g. 'foo%'");

        assert_eq!(error.code_str(), "E200");
        assert_eq!(error.kind(), ErrorKind::Type);
        assert!(error.hint.is_some());
        assert_eq!(error.to_string(), "[E200] Undefined variable 'foo'");
    }

    #[test]
    fn test_source_location() {
        let loc = SourceLocation::from_offset("a = 1\nb = 2\n", 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.line_content, "b = 2");
    }

    #[test]
    fn test_format_error() {
        let source = "x% = 1\ny = z\n";
        let error = CompileError::new(ErrorCode::UndefinedVariable, "Undefined variable 'z'", Span::new(11, 12));
        let output = format_error(&error, source, Some("demo.bas"));
        assert!(output.starts_with("error[E200]: Undefined variable 'z'\n"));
        assert!(output.contains("--> demo.bas:2:5"));
        assert!(output.contains("y = z"));
    }

    #[test]
    fn test_format_warning() {
        let source = "x% = 1.5\n";
        let warning = CompileWarning::new(WarningCode::PrecisionLoss, "precision loss", Span::new(5, 8));
        let output = format_warning(&warning, source, None);
        assert!(output.starts_with("warning[W001]: precision loss\n"));
        assert!(output.contains("--> <input>:1:6"));
    }

    #[test]
    fn test_render_report_mentions_code() {
        let source = "print 1 +\n";
        let error = CompileError::new(ErrorCode::ExpectedExpression, "Expected expression", Span::new(9, 10));
        let output = render_report(&error, source, "demo.bas", false);
        assert!(output.contains("E103"));
        assert!(output.contains("Expected expression"));
    }

    #[test]
    fn test_build_error_errors() {
        let error = CompileError::new(ErrorCode::VerificationFailed, "bad", Span::default());
        let build = BuildError::Codegen(error);
        assert_eq!(build.errors().len(), 1);
        assert_eq!(build.to_string(), "code generation failed: [E304] bad");
    }
}
