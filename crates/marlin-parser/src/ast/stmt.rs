//! Statement nodes.

use super::expr::Expression;
use super::node::NodeId;
use super::types::TypeReference;
use marlin_core::SourceLocation;

/// A `{ ... }` sequence of statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    LocalVariable(LocalVariable),
    Return(ReturnStatement),
    /// A method call or assignment followed by `;`.
    Expression(Expression),
    Block(Block),
    /// A lone `;`.
    Empty,
}

/// `[mut] Type name [= initializer];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub type_ref: TypeReference,
    pub name: String,
    pub mutable: bool,
    pub initializer: Option<Expression>,
}

/// `return [value];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub value: Option<Expression>,
}
