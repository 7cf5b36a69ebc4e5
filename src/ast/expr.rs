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

//! Expression AST nodes for the Basalt compiler.

use crate::error::Span;

/// Identity of an expression node, unique within one program.
///
/// Analysis results are stored in side tables keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// An expression in the Basalt language.
#[derive(Debug, Clone)]
pub struct Expr {
    /// Node identity.
    pub id: ExprId,
    /// The kind of expression.
    pub kind: ExprKind,
    /// The source span of this expression.
    pub span: Span,
}

impl Expr {
    /// Create a new expression.
    pub fn new(id: ExprId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Check if this expression is a literal, optionally negated.
    pub fn is_constant(&self) -> bool {
        match &self.kind {
            ExprKind::IntegerLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::StringLiteral(_) => true,
            ExprKind::Unary {
                op: UnaryOp::Negate,
                operand,
            } => operand.is_constant(),
            _ => false,
        }
    }
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// An integer literal.
    IntegerLiteral(i32),

    /// A float literal.
    FloatLiteral(f32),

    /// A string literal.
    StringLiteral(String),

    /// A variable reference.
    Variable(String),

    /// A unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// A binary operation, including assignment.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// A function call.
    Call { callee: String, args: Vec<Expr> },

    /// A return, with an optional value.
    Return(Option<Box<Expr>>),
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Get the precedence of this operator (higher = binds tighter).
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Assign => 10,
            BinaryOp::Add | BinaryOp::Sub => 20,
            BinaryOp::Mul | BinaryOp::Div => 30,
        }
    }

    /// Check if this operator is left-associative.
    pub fn is_left_associative(&self) -> bool {
        !matches!(self, BinaryOp::Assign)
    }

    /// Check if this operator is arithmetic.
    pub fn is_arithmetic(&self) -> bool {
        !matches!(self, BinaryOp::Assign)
    }

    /// Get a string representation of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`).
    Negate,
    /// Logical not (`not` or `!`).
    Not,
}

impl UnaryOp {
    /// Get a string representation of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "not ",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Renders fully parenthesized source text.
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::IntegerLiteral(n) => write!(f, "{}", n),
            ExprKind::FloatLiteral(n) => write!(f, "{:?}", n),
            ExprKind::StringLiteral(s) => write!(f, "\"{}\"", s),
            ExprKind::Variable(name) => write!(f, "{}", name),
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op, operand),
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ExprKind::Return(Some(value)) => write!(f, "return {}", value),
            ExprKind::Return(None) => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(id: u32, n: i32) -> Expr {
        Expr::new(ExprId(id), ExprKind::IntegerLiteral(n), Span::default())
    }

    #[test]
    fn test_precedence_order() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Assign.precedence());
        assert_eq!(BinaryOp::Div.precedence(), BinaryOp::Mul.precedence());
    }

    #[test]
    fn test_assign_is_right_associative() {
        assert!(!BinaryOp::Assign.is_left_associative());
        assert!(BinaryOp::Sub.is_left_associative());
    }

    #[test]
    fn test_display() {
        let expr = Expr::new(
            ExprId(2),
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(lit(0, 1)),
                right: Box::new(lit(1, 2)),
            },
            Span::default(),
        );
        assert_eq!(expr.to_string(), "(1 + 2)");
    }

    #[test]
    fn test_is_constant() {
        let negated = Expr::new(
            ExprId(1),
            ExprKind::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(lit(0, 4)),
            },
            Span::default(),
        );
        assert!(negated.is_constant());

        let variable = Expr::new(ExprId(2), ExprKind::Variable("x".into()), Span::default());
        assert!(!variable.is_constant());
    }
}
