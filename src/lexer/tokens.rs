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

//! Token definitions for the Basalt language.

use logos::Logos;

use crate::symbols::SymbolType;

/// Raw scanner failures, mapped to diagnostics by the [`Lexer`](super::Lexer).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    /// No rule matches the input.
    #[default]
    InvalidCharacter,
    /// Integer literal does not fit into 32 bits.
    IntegerTooLarge,
    /// Float literal cannot be parsed.
    InvalidNumber,
}

fn lex_integer(lex: &mut logos::Lexer<Token>) -> Result<i32, LexError> {
    lex.slice()
        .replace('_', "")
        .parse()
        .map_err(|_| LexError::IntegerTooLarge)
}

fn lex_float(lex: &mut logos::Lexer<Token>) -> Result<f32, LexError> {
    lex.slice()
        .replace('_', "")
        .parse()
        .map_err(|_| LexError::InvalidNumber)
}

fn lex_string(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

/// A token in the Basalt language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    // Literals
    /// Integer literal, `_` separators removed.
    #[regex(r"[0-9][0-9_]*", lex_integer)]
    Integer(i32),
    /// Float literal (any numeral containing a `.`).
    #[regex(r"[0-9][0-9_]*\.[0-9_]*", lex_float)]
    #[regex(r"\.[0-9][0-9_]*", lex_float)]
    Float(f32),
    /// String literal without the surrounding quotes.
    #[regex(r#""[^"\n]*""#, lex_string)]
    String(String),
    /// Identifier, lowercased.
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*", |lex| lex.slice().to_ascii_lowercase())]
    Identifier(String),

    // Keywords (produced from identifiers by `from_keyword_or_identifier`)
    /// `function` - function definition.
    Function,
    /// `extern` - runtime function declaration.
    Extern,
    /// `end` - closes a function body.
    End,
    /// `return` - leave the current function.
    Return,
    /// `not` or `!` - logical not.
    #[token("!")]
    Not,

    // Type markers
    /// `%` - Int marker.
    #[token("%")]
    IntMarker,
    /// `#` - Float marker.
    #[token("#")]
    FloatMarker,
    /// `$` - String marker.
    #[token("$")]
    StringMarker,

    // Operators
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `=`
    #[token("=")]
    Equal,

    // Punctuation
    /// `(`
    #[token("(")]
    LeftParen,
    /// `)`
    #[token(")")]
    RightParen,
    /// `,`
    #[token(",")]
    Comma,

    /// Line break or `:`. Comments run up to the line break.
    #[token("\n")]
    #[token(":")]
    #[regex(r";[^\n]*", logos::skip)]
    EndOfStatement,
}

impl Token {
    /// Turn an identifier into a keyword token if it spells one.
    pub fn from_keyword_or_identifier(name: String) -> Token {
        match name.as_str() {
            "function" => Token::Function,
            "extern" => Token::Extern,
            "end" => Token::End,
            "return" => Token::Return,
            "not" => Token::Not,
            _ => Token::Identifier(name),
        }
    }

    /// The variable type a marker token stands for.
    pub fn marker_type(&self) -> Option<SymbolType> {
        match self {
            Token::IntMarker => Some(SymbolType::Int),
            Token::FloatMarker => Some(SymbolType::Float),
            Token::StringMarker => Some(SymbolType::String),
            _ => None,
        }
    }

    /// Check if this token ends an expression.
    pub fn ends_expression(&self) -> bool {
        matches!(
            self,
            Token::EndOfStatement | Token::RightParen | Token::Comma
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{}", n),
            Token::Float(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Function => write!(f, "function"),
            Token::Extern => write!(f, "extern"),
            Token::End => write!(f, "end"),
            Token::Return => write!(f, "return"),
            Token::Not => write!(f, "not"),
            Token::IntMarker => write!(f, "%"),
            Token::FloatMarker => write!(f, "#"),
            Token::StringMarker => write!(f, "$"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Equal => write!(f, "="),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::EndOfStatement => write!(f, "end of statement"),
        }
    }
}
