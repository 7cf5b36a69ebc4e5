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

//! Semantic analyzer module for the Basalt compiler.
//!
//! This module performs semantic analysis on a parsed [`Program`]:
//! - Variable and call resolution
//! - Type inference over the conversion lattice
//! - Default value and return checks
//! - Precision-loss warnings
//!
//! The result is an [`Analysis`]: a side table mapping every expression id
//! to its resolved type and every call to its resolved target. Code
//! generation reads it and never re-derives a type.
//!
//! Errors are collected per statement; one bad statement does not stop the
//! analysis of the rest of the program.
//!
//! # Module Structure
//!
//! - `context` - The function currently being analyzed
//! - `expressions` - Type inference (ExpressionAnalyzer trait)
//! - `functions` - Calls, returns and defaults (FunctionAnalyzer trait)
//! - `operators` - Operator typing (OperatorChecker trait)

pub mod context;
pub mod expressions;
pub mod functions;
pub mod operators;

use std::collections::HashMap;

use log::debug;

use crate::ast::{Expr, ExprId, ExprKind, FunctionAst, Program};
use crate::error::{CompileError, CompileWarning, Span, WarningCode};
use crate::symbols::{CallTarget, Conversion, SymbolType};
use context::AnalysisContext;
use expressions::ExpressionAnalyzer;
use functions::FunctionAnalyzer;

/// Resolved types and call targets, keyed by expression id.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    types: HashMap<ExprId, SymbolType>,
    calls: HashMap<ExprId, CallTarget>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<CompileWarning>,
}

impl Analysis {
    /// The resolved type of an expression.
    pub fn type_of(&self, id: ExprId) -> Option<SymbolType> {
        self.types.get(&id).copied()
    }

    /// The resolved target of a call expression.
    pub fn call_target(&self, id: ExprId) -> Option<&CallTarget> {
        self.calls.get(&id)
    }

    /// Number of typed expressions.
    pub fn typed_count(&self) -> usize {
        self.types.len()
    }
}

/// The semantic analyzer.
pub struct Analyzer<'p> {
    /// The program under analysis.
    pub(crate) program: &'p Program,
    /// Results collected so far.
    pub(crate) analysis: Analysis,
    /// Collected errors.
    errors: Vec<CompileError>,
    /// The function being analyzed.
    pub(crate) context: AnalysisContext<'p>,
}

impl<'p> Analyzer<'p> {
    /// Create a new analyzer for `program`.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            analysis: Analysis::default(),
            errors: Vec::new(),
            context: AnalysisContext::entry(&program.main.signature),
        }
    }

    /// Analyze the whole program.
    pub fn analyze(mut self) -> Result<Analysis, Vec<CompileError>> {
        let program = self.program;

        for function in program.functions.values().flatten() {
            self.analyze_function(function, false);
        }
        self.analyze_function(&program.main, true);

        debug!(
            "analysis finished: {} typed nodes, {} errors, {} warnings",
            self.analysis.typed_count(),
            self.errors.len(),
            self.analysis.warnings.len()
        );

        if self.errors.is_empty() {
            Ok(self.analysis)
        } else {
            Err(self.errors)
        }
    }

    /// Analyze one function: its defaults, then every statement of its body.
    fn analyze_function(&mut self, function: &'p FunctionAst, is_entry: bool) {
        self.context = if is_entry {
            AnalysisContext::entry(&function.signature)
        } else {
            AnalysisContext::function(&function.signature)
        };

        for argument in &function.signature.arguments {
            if let Err(error) = self.check_default(argument) {
                self.error(error);
            }
        }

        for statement in &function.body {
            if let Err(error) = self.analyze_statement(statement) {
                self.error(error);
            }
        }
    }

    /// Analyze one statement. `return` is only accepted here, at the root.
    fn analyze_statement(&mut self, statement: &Expr) -> Result<(), CompileError> {
        match &statement.kind {
            ExprKind::Return(value) => self.check_return(statement, value.as_deref()),
            _ => self.infer(statement).map(|_| ()),
        }
    }

    /// Record the type of an expression.
    pub(crate) fn record(&mut self, id: ExprId, symbol_type: SymbolType) -> SymbolType {
        self.analysis.types.insert(id, symbol_type);
        symbol_type
    }

    /// Record the target of a call expression.
    pub(crate) fn record_call(&mut self, id: ExprId, target: CallTarget) {
        self.analysis.calls.insert(id, target);
    }

    /// Check a conversion, warning when it narrows.
    ///
    /// Returns the conversion so the caller can reject illegal ones with
    /// its own error code.
    pub(crate) fn check_conversion(&mut self, from: SymbolType, to: SymbolType, span: &Span) -> Conversion {
        let conversion = from.conversion_to(to);
        if conversion == Conversion::Narrowing {
            self.warning(CompileWarning::new(
                WarningCode::PrecisionLoss,
                format!("Implicit conversion from {} to {} loses precision", from, to),
                span.clone(),
            ));
        }
        conversion
    }

    /// Record an error.
    pub(crate) fn error(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Record a warning.
    pub(crate) fn warning(&mut self, warning: CompileWarning) {
        self.analysis.warnings.push(warning);
    }
}

/// Analyze a program.
pub fn analyze(program: &Program) -> Result<Analysis, Vec<CompileError>> {
    Analyzer::new(program).analyze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn program(source: &str) -> Program {
        let tokens = tokenize(source).expect("tokenize");
        parse(&tokens).expect("parse")
    }

    fn analyze_source(source: &str) -> Result<Analysis, Vec<CompileError>> {
        analyze(&program(source))
    }

    fn error_codes(source: &str) -> Vec<ErrorCode> {
        match analyze_source(source) {
            Ok(_) => panic!("Expected semantic errors"),
            Err(errors) => errors.into_iter().map(|e| e.code).collect(),
        }
    }

    /// Type of the right-hand side of the `index`th top-level assignment.
    fn assigned_type(source: &str, index: usize) -> SymbolType {
        let program = program(source);
        let analysis = analyze(&program).expect("analysis");
        let ExprKind::Binary { right, .. } = &program.main.body[index].kind else {
            panic!("Expected assignment");
        };
        analysis.type_of(right.id).expect("typed")
    }

    // ========================================
    // Literal and Variable Tests
    // ========================================

    #[test]
    fn test_literal_types() {
        assert_eq!(assigned_type("a = 1", 0), SymbolType::Int);
        assert_eq!(assigned_type("a# = 1.5", 0), SymbolType::Float);
        assert_eq!(assigned_type("a$ = \"s\"", 0), SymbolType::String);
    }

    #[test]
    fn test_assignment_result_is_target_type() {
        let program = program("x# = 1");
        let analysis = analyze(&program).expect("analysis");
        assert_eq!(analysis.type_of(program.main.body[0].id), Some(SymbolType::Float));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(error_codes("x = y + 1"), vec![ErrorCode::UndefinedVariable]);
    }

    // ========================================
    // Operator Tests
    // ========================================

    #[test]
    fn test_precedence_evaluates_to_int() {
        assert_eq!(assigned_type("x = 1 + 2 * 3", 0), SymbolType::Int);
    }

    #[test]
    fn test_widening_to_float() {
        assert_eq!(assigned_type("x# = 1 + 2.5", 0), SymbolType::Float);
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(assigned_type("x$ = \"x\" + 1", 0), SymbolType::String);
        assert_eq!(assigned_type("x$ = 2.5 + \"x\"", 0), SymbolType::String);
    }

    #[test]
    fn test_string_subtraction_rejected() {
        assert_eq!(error_codes("x$ = \"x\" - 1"), vec![ErrorCode::InvalidOperatorForType]);
        assert_eq!(error_codes("x$ = \"x\" * \"y\""), vec![ErrorCode::InvalidOperatorForType]);
    }

    #[test]
    fn test_negate_string_rejected() {
        assert_eq!(error_codes("x$ = -\"a\""), vec![ErrorCode::InvalidOperatorForType]);
    }

    #[test]
    fn test_not_yields_int() {
        assert_eq!(assigned_type("x = not 2.5", 0), SymbolType::Int);
    }

    #[test]
    fn test_negate_keeps_type() {
        assert_eq!(assigned_type("x# = -2.5", 0), SymbolType::Float);
    }

    // ========================================
    // Assignment Tests
    // ========================================

    #[test]
    fn test_string_into_int_rejected() {
        assert_eq!(error_codes("x% = \"a\""), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn test_narrowing_warns() {
        let analysis = analyze_source("x% = 2.5").expect("analysis");
        assert_eq!(analysis.warnings.len(), 1);
        assert_eq!(analysis.warnings[0].code, WarningCode::PrecisionLoss);
    }

    #[test]
    fn test_narrowing_inside_function_warns() {
        let analysis = analyze_source("function f()\n  n% = 1.5\nend function\n").expect("analysis");
        assert_eq!(analysis.warnings.len(), 1);
    }

    #[test]
    fn test_assign_to_literal_rejected() {
        assert_eq!(error_codes("1 = 2"), vec![ErrorCode::InvalidAssignmentTarget]);
    }

    #[test]
    fn test_number_into_string_stringifies() {
        assert!(analyze_source("s$ = 42\nt$ = 1.5").is_ok());
    }

    // ========================================
    // Call Tests
    // ========================================

    #[test]
    fn test_call_resolves_to_return_type() {
        assert_eq!(assigned_type("x# = sin(1.0)", 0), SymbolType::Float);
        assert_eq!(
            assigned_type("function g$()\n  return \"a\"\nend function\nx$ = g()", 0),
            SymbolType::String
        );
    }

    #[test]
    fn test_call_records_target() {
        let program = program("function f(a)\nend function\nf 1\n");
        let analysis = analyze(&program).expect("analysis");
        let target = analysis.call_target(program.main.body[0].id).expect("target");
        assert_eq!(
            *target,
            CallTarget::Function {
                name: "f".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_undefined_function() {
        assert_eq!(error_codes("missing(1)"), vec![ErrorCode::UndefinedFunction]);
    }

    #[test]
    fn test_wrong_arity() {
        assert_eq!(
            error_codes("function f(a)\nend function\nf(1, 2)\n"),
            vec![ErrorCode::UndefinedFunction]
        );
    }

    #[test]
    fn test_argument_type_mismatch() {
        assert_eq!(error_codes("x = len(5)\ny = sin(\"a\")"), vec![ErrorCode::ArgumentTypeMismatch]);
    }

    #[test]
    fn test_number_argument_stringifies() {
        assert!(analyze_source("println 42").is_ok());
    }

    // ========================================
    // Function Tests
    // ========================================

    #[test]
    fn test_return_type_mismatch() {
        assert_eq!(
            error_codes("function f%()\n  return \"a\"\nend function\n"),
            vec![ErrorCode::ReturnTypeMismatch]
        );
    }

    #[test]
    fn test_nested_return_rejected() {
        assert_eq!(
            error_codes("function f()\n  x = return 1\nend function\n"),
            vec![ErrorCode::ReturnNotAtStatementStart]
        );
    }

    #[test]
    fn test_parameters_are_visible() {
        assert!(analyze_source("function f#(a#, b% = 2)\n  return a * b\nend function\n").is_ok());
    }

    #[test]
    fn test_default_must_be_constant() {
        assert_eq!(
            error_codes("g = 1\nfunction f(a = g)\nend function\n"),
            vec![ErrorCode::ConstantExpressionRequired]
        );
    }

    #[test]
    fn test_default_must_convert() {
        assert_eq!(
            error_codes("function f(a% = \"x\")\nend function\n"),
            vec![ErrorCode::TypeMismatch]
        );
    }

    #[test]
    fn test_negative_default_is_constant() {
        assert!(analyze_source("function f(a# = -1.5)\nend function\n").is_ok());
    }

    #[test]
    fn test_errors_collected_per_statement() {
        let codes = error_codes("a = b\nc$ = \"x\" - 1\nfunction f%()\n  return \"s\"\nend function\n");
        assert_eq!(codes.len(), 3);
        assert!(codes.contains(&ErrorCode::UndefinedVariable));
        assert!(codes.contains(&ErrorCode::InvalidOperatorForType));
        assert!(codes.contains(&ErrorCode::ReturnTypeMismatch));
    }

    #[test]
    fn test_function_sees_globals() {
        assert!(analyze_source("g# = 1.5\nfunction f#()\n  return g\nend function\n").is_ok());
    }
}
