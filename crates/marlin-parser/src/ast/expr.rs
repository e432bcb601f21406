//! Expression nodes.
//!
//! Marlin has no unary operators and no literals other than integers and
//! `null`. Member accesses, method calls and assignments may carry a
//! *target*, the expression on the left of a `.`.

use super::node::NodeId;
use super::ops::BinaryOperator;
use super::types::TypeReference;
use marlin_core::SourceLocation;

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    /// A qualified type name used as a value, e.g. `std::Console` in
    /// `std::Console.WriteLine(1)`.
    TypeReference(TypeReference),
    /// `target.member_name`, or a bare name.
    MemberAccess {
        target: Option<Box<Expression>>,
        member_name: String,
    },
    /// `target.method_name(args)`; a trailing `@` marks a native call.
    MethodCall {
        target: Option<Box<Expression>>,
        method_name: String,
        is_native_call: bool,
        args: Vec<Expression>,
    },
    /// `target.name = value`
    VariableAssignment {
        target: Option<Box<Expression>>,
        name: String,
        value: Box<Expression>,
    },
    /// `new Type(args)`
    NewClassInitializer {
        type_ref: TypeReference,
        constructor_args: Vec<Expression>,
    },
    Integer {
        value: i64,
    },
    Null,
    BinaryOperator {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn new(id: NodeId, location: Option<SourceLocation>, kind: ExpressionKind) -> Self {
        Self { id, location, kind }
    }

    /// Whether this expression may stand on the right of a `.`.
    pub fn is_indexable(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::MemberAccess { .. }
                | ExpressionKind::MethodCall { .. }
                | ExpressionKind::VariableAssignment { .. }
        )
    }

    /// Whether this expression is allowed as a statement on its own.
    pub fn is_statement_expression(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::MethodCall { .. } | ExpressionKind::VariableAssignment { .. }
        )
    }

    pub fn target(&self) -> Option<&Expression> {
        match &self.kind {
            ExpressionKind::MemberAccess { target, .. }
            | ExpressionKind::MethodCall { target, .. }
            | ExpressionKind::VariableAssignment { target, .. } => target.as_deref(),
            _ => None,
        }
    }

    /// Attach `new_target` as the target of an indexable expression.
    ///
    /// Returns the expression unchanged as `Err` when it is not indexable.
    pub fn with_target(mut self, new_target: Expression) -> Result<Expression, Expression> {
        match &mut self.kind {
            ExpressionKind::MemberAccess { target, .. }
            | ExpressionKind::MethodCall { target, .. }
            | ExpressionKind::VariableAssignment { target, .. } => {
                *target = Some(Box::new(new_target));
                Ok(self)
            }
            _ => Err(self),
        }
    }

    /// Short name of the expression kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ExpressionKind::TypeReference(_) => "type reference",
            ExpressionKind::MemberAccess { .. } => "member access",
            ExpressionKind::MethodCall { .. } => "method call",
            ExpressionKind::VariableAssignment { .. } => "assignment",
            ExpressionKind::NewClassInitializer { .. } => "new",
            ExpressionKind::Integer { .. } => "integer",
            ExpressionKind::Null => "null",
            ExpressionKind::BinaryOperator { .. } => "binary operator",
        }
    }
}
