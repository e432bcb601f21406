//! Return path verification for non-void methods.
//!
//! Marlin bodies have no branching statements, so every path through a block
//! is the block itself: it returns if one of its statements is a `return`,
//! or a nested block that returns.

use marlin_parser::ast::{Block, Statement};

/// Verifies all code paths return a value.
pub struct ReturnChecker;

impl ReturnChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check whether every path through `block` ends in a `return`.
    pub fn all_paths_return(&self, block: &Block) -> bool {
        block.statements.iter().any(|statement| match statement {
            Statement::Return(_) => true,
            Statement::Block(inner) => self.all_paths_return(inner),
            Statement::LocalVariable(_) | Statement::Expression(_) | Statement::Empty => false,
        })
    }
}

impl Default for ReturnChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_parser::ast::{FileId, Member, Parser};

    fn body(statements: &str) -> Block {
        let source = format!("module m; public class A {{ public void F() {{ {statements} }} }}");
        let unit = Parser::parse_source(&source, "test.mn", FileId(0)).unit.unwrap();
        match &unit.types[0].members()[0] {
            Member::Method(method) => method.body.clone(),
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_does_not_return() {
        assert!(!ReturnChecker::new().all_paths_return(&body("")));
    }

    #[test]
    fn trailing_and_nested_returns() {
        let checker = ReturnChecker::new();
        assert!(checker.all_paths_return(&body("Run(); return 1;")));
        assert!(checker.all_paths_return(&body("{ { return; } }")));
        assert!(!checker.all_paths_return(&body("{ Run(); } ;")));
    }
}
