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

//! Function definitions, signatures and extern declarations.

use log::debug;

use super::expressions::ExpressionParser;
use super::helpers::ParserHelpers;
use super::statements::StatementParser;
use super::Parser;
use crate::ast::{FunctionArgument, FunctionAst, FunctionSignature};
use crate::error::{CompileError, ErrorCode, Span};
use crate::lexer::Token;
use crate::symbols::{SymbolTable, SymbolType};

/// Trait for function and extern parsing.
pub trait FunctionParser {
    /// Parse `function name[marker](args) ... end function`.
    fn parse_function_definition(&mut self) -> Result<(), CompileError>;

    /// Parse `extern name[marker](args)`.
    fn parse_extern_declaration(&mut self) -> Result<(), CompileError>;

    /// Parse a function name, optional return marker and argument list.
    ///
    /// Returns the name, return type, arguments and the span of the header.
    fn parse_signature_parts(
        &mut self,
        allow_defaults: bool,
    ) -> Result<(String, SymbolType, Vec<FunctionArgument>, Span), CompileError>;

    /// Parse one argument: `name [marker] [= default]`.
    fn parse_argument(&mut self, allow_defaults: bool) -> Result<FunctionArgument, CompileError>;

    /// Reject a signature whose overload shape already exists.
    fn check_duplicate(&self, signature: &FunctionSignature) -> Result<(), CompileError>;
}

impl<'a> FunctionParser for Parser<'a> {
    fn parse_function_definition(&mut self) -> Result<(), CompileError> {
        let start = self.previous_span();

        let (name, return_type, arguments, header_span) = match self.parse_signature_parts(true) {
            Ok(parts) => parts,
            Err(error) => {
                self.local = None;
                self.skip_past_end_function();
                return Err(error);
            }
        };
        if let Err(error) = self.expect_statement_end() {
            self.local = None;
            self.skip_past_end_function();
            return Err(error);
        }

        let body = self.parse_function_body(&start)?;
        let symbols = self.local.take().unwrap_or_default();
        let signature = FunctionSignature::new(name, return_type, arguments, symbols, start.merge(&header_span));

        if let Err(error) = self.check_duplicate(&signature) {
            // The definition ended cleanly; record and continue with the next statement.
            self.errors.push(error);
            return Ok(());
        }
        debug!("registered {} as {}", signature, signature.symbol_name);

        self.program.globals.insert(signature.name.clone(), SymbolType::Function);
        self.program
            .functions
            .entry(signature.name.clone())
            .or_default()
            .push(FunctionAst::new(signature, body));
        Ok(())
    }

    fn parse_extern_declaration(&mut self) -> Result<(), CompileError> {
        let start = self.previous_span();
        let parsed = self.parse_signature_parts(false);
        self.local = None;
        let (name, return_type, arguments, header_span) = parsed?;
        self.expect_statement_end()?;

        let signature = FunctionSignature::external(name, return_type, arguments, start.merge(&header_span));
        if let Some(existing) = self.program.externs.get(&signature.name) {
            let same_shape = existing.return_type == signature.return_type
                && existing.arguments.len() == signature.arguments.len()
                && existing
                    .arguments
                    .iter()
                    .zip(&signature.arguments)
                    .all(|(a, b)| a.arg_type == b.arg_type);
            if !same_shape {
                let error = CompileError::new(
                    ErrorCode::DuplicateSignature,
                    format!("Extern '{}' is already declared as {}", existing.name, existing),
                    signature.span,
                );
                self.errors.push(error);
                return Ok(());
            }
            debug!("extern {} redeclared with identical shape", signature.name);
            return Ok(());
        }

        self.program.externs.insert(signature.name.clone(), signature);
        Ok(())
    }

    fn parse_signature_parts(
        &mut self,
        allow_defaults: bool,
    ) -> Result<(String, SymbolType, Vec<FunctionArgument>, Span), CompileError> {
        let (name_token, name_span) =
            self.expect(&Token::Identifier(String::new()), ErrorCode::ExpectedFunctionName, "Expected function name")?;
        let Token::Identifier(name) = name_token else {
            return Err(CompileError::new(ErrorCode::ExpectedFunctionName, "Expected function name", name_span));
        };

        let return_type = match self.peek().and_then(Token::marker_type) {
            Some(ty) => {
                self.advance();
                ty
            }
            None => SymbolType::Int,
        };

        self.expect(&Token::LeftParen, ErrorCode::ExpectedOpenParen, "Expected '(' after function name")?;

        self.local = Some(SymbolTable::new());
        let mut arguments: Vec<FunctionArgument> = Vec::new();
        if !self.match_token(&Token::RightParen) {
            loop {
                let argument = self.parse_argument(allow_defaults)?;
                if arguments.iter().any(|a| a.name == argument.name) {
                    return Err(CompileError::new(
                        ErrorCode::DuplicateParameterName,
                        format!("Duplicate parameter '{}'", argument.name),
                        argument.span,
                    ));
                }
                let follows_optional = arguments.last().is_some_and(|a| !a.is_mandatory());
                if follows_optional && argument.is_mandatory() {
                    return Err(CompileError::new(
                        ErrorCode::MalformedSignature,
                        format!("Mandatory parameter '{}' follows an optional one", argument.name),
                        argument.span,
                    )
                    .with_hint("Move parameters with defaults to the end"));
                }
                if let Some(local) = &mut self.local {
                    local.insert(argument.name.clone(), argument.arg_type);
                }
                arguments.push(argument);

                if self.match_token(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RightParen, ErrorCode::ExpectedCloseParen, "Expected ')' after parameters")?;
                break;
            }
        }

        Ok((name, return_type, arguments, name_span.merge(&self.previous_span())))
    }

    fn parse_argument(&mut self, allow_defaults: bool) -> Result<FunctionArgument, CompileError> {
        let (token, span) =
            self.expect(&Token::Identifier(String::new()), ErrorCode::ExpectedIdentifier, "Expected parameter name")?;
        let Token::Identifier(name) = token else {
            return Err(CompileError::new(ErrorCode::ExpectedIdentifier, "Expected parameter name", span));
        };

        let arg_type = match self.peek().and_then(Token::marker_type) {
            Some(ty) => {
                self.advance();
                ty
            }
            None => SymbolType::Int,
        };

        let default = if self.check(&Token::Equal) {
            if !allow_defaults {
                return Err(self.error(
                    ErrorCode::DefaultOnExternArgument,
                    format!("Extern parameter '{}' cannot have a default value", name),
                ));
            }
            self.advance();
            Some(self.parse_expression(false)?)
        } else {
            None
        };

        let span = span.merge(&self.previous_span());
        Ok(FunctionArgument::new(name, arg_type, default, span))
    }

    fn check_duplicate(&self, signature: &FunctionSignature) -> Result<(), CompileError> {
        let key = signature.key();
        let duplicate = self
            .program
            .overloads(&signature.name)
            .iter()
            .any(|existing| existing.signature.key() == key);
        if duplicate {
            return Err(CompileError::new(
                ErrorCode::DuplicateSignature,
                format!("Function '{}' already has an overload with {}", signature.name, key),
                signature.span.clone(),
            )
            .with_hint("Overloads must differ in their number of mandatory or optional parameters"));
        }
        Ok(())
    }
}
