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

//! Lexer module for the Basalt compiler.
//!
//! This module tokenizes Basalt source code into a stream of tokens.
//! It handles:
//! - Keywords and lowercased identifiers
//! - Type markers (`%`, `#`, `$`)
//! - Integer, float and string literals
//! - Statement separators (line breaks and `:`)
//! - Comments (starting with `;`)

mod tokens;

pub use tokens::{LexError, Token};

use logos::Logos;

use crate::error::{CompileError, ErrorCode, Span};

/// The lexer state for tokenizing source code.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }

    /// Get the next token from the source, `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<(Token, Span)>, CompileError> {
        let Some(result) = self.inner.next() else {
            return Ok(None);
        };
        let span = Span::from_range(self.inner.span());

        match result {
            Ok(Token::Identifier(name)) => {
                Ok(Some((Token::from_keyword_or_identifier(name), span)))
            }
            Ok(token) => Ok(Some((token, span))),
            Err(error) => Err(self.lex_error(error, span)),
        }
    }

    fn lex_error(&self, error: LexError, span: Span) -> CompileError {
        let slice = self.inner.slice();
        match error {
            LexError::InvalidCharacter if slice.starts_with('"') => CompileError::new(
                ErrorCode::UnterminatedString,
                "Unterminated string literal",
                span,
            )
            .with_hint("Close the string with '\"' before the end of the line"),
            LexError::InvalidCharacter => CompileError::new(
                ErrorCode::InvalidCharacter,
                format!("Invalid character '{}'", slice),
                span,
            ),
            LexError::IntegerTooLarge => CompileError::new(
                ErrorCode::IntegerTooLarge,
                format!("Integer literal '{}' does not fit into 32 bits", slice),
                span,
            ),
            LexError::InvalidNumber => CompileError::new(
                ErrorCode::InvalidNumber,
                format!("Invalid number literal '{}'", slice),
                span,
            ),
        }
    }
}

/// Tokenize the entire source code.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, CompileError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(token_span) = lexer.next_token()? {
        tokens.push(token_span);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    // ========================================
    // Basic Token Tests
    // ========================================

    #[test]
    fn test_arithmetic_operators() {
        assert_eq!(
            kinds("+ - * / ="),
            vec![Token::Plus, Token::Minus, Token::Star, Token::Slash, Token::Equal]
        );
    }

    #[test]
    fn test_type_markers_split_from_identifier() {
        assert_eq!(
            kinds("a% b# c$"),
            vec![
                Token::Identifier("a".to_string()),
                Token::IntMarker,
                Token::Identifier("b".to_string()),
                Token::FloatMarker,
                Token::Identifier("c".to_string()),
                Token::StringMarker,
            ]
        );
    }

    #[test]
    fn test_identifiers_are_lowercased() {
        assert_eq!(kinds("FooBar"), vec![Token::Identifier("foobar".to_string())]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("Function EXTERN end Return not !"),
            vec![
                Token::Function,
                Token::Extern,
                Token::End,
                Token::Return,
                Token::Not,
                Token::Not,
            ]
        );
    }

    // ========================================
    // Literal Tests
    // ========================================

    #[test]
    fn test_integer_with_separators() {
        assert_eq!(kinds("1_000_000"), vec![Token::Integer(1_000_000)]);
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(
            kinds("3.5 .25 2."),
            vec![Token::Float(3.5), Token::Float(0.25), Token::Float(2.0)]
        );
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(kinds("\"hello world\""), vec![Token::String("hello world".to_string())]);
    }

    #[test]
    fn test_unterminated_string() {
        let error = tokenize("a$ = \"oops\nb = 1").unwrap_err();
        assert_eq!(error.code, ErrorCode::UnterminatedString);
    }

    #[test]
    fn test_integer_too_large() {
        let error = tokenize("x = 99999999999").unwrap_err();
        assert_eq!(error.code, ErrorCode::IntegerTooLarge);
    }

    #[test]
    fn test_invalid_character() {
        let error = tokenize("x = 1 @ 2").unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidCharacter);
        assert_eq!(error.span, Span::new(6, 7));
    }

    // ========================================
    // Statement Separator Tests
    // ========================================

    #[test]
    fn test_newline_and_colon_end_statements() {
        assert_eq!(
            kinds("a = 1 : b = 2\n"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Equal,
                Token::Integer(1),
                Token::EndOfStatement,
                Token::Identifier("b".to_string()),
                Token::Equal,
                Token::Integer(2),
                Token::EndOfStatement,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("; a comment\nx = 1 ; trailing"),
            vec![
                Token::EndOfStatement,
                Token::Identifier("x".to_string()),
                Token::Equal,
                Token::Integer(1),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("ab = 12").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 2));
        assert_eq!(tokens[2].1, Span::new(5, 7));
    }
}
