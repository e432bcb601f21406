//! Binary operators.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `**`
    Power,
}

impl BinaryOperator {
    /// Convert an operator token kind.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use BinaryOperator::*;
        Some(match kind {
            TokenKind::Or => Or,
            TokenKind::And => And,
            TokenKind::Equal => Equal,
            TokenKind::NotEqual => NotEqual,
            TokenKind::Plus => Add,
            TokenKind::Minus => Subtract,
            TokenKind::Asterisk => Multiply,
            TokenKind::Slash => Divide,
            TokenKind::Power => Power,
            _ => return None,
        })
    }

    /// Operators whose result is a boolean regardless of operand types.
    pub fn is_comparison_or_logical(self) -> bool {
        matches!(
            self,
            BinaryOperator::Or | BinaryOperator::And | BinaryOperator::Equal | BinaryOperator::NotEqual
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "**",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
