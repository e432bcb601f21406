//! Side tables for resolved facts.
//!
//! AST nodes are never mutated by the resolver. Everything it learns about a
//! node (the symbol a declaration opened, the symbol a name refers to, the
//! type an expression has) is recorded here, keyed by [`NodeId`].

use marlin_core::ResolveError;
use marlin_parser::NodeId;
use marlin_registry::{SymbolId, TypeUsage};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    symbols: FxHashMap<NodeId, SymbolId>,
    types: FxHashMap<NodeId, TypeUsage>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the symbol a node declares or refers to.
    pub fn bind_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.symbols.insert(node, symbol);
    }

    /// Record the resolved type of a node.
    pub fn bind_type(&mut self, node: NodeId, usage: TypeUsage) {
        self.types.insert(node, usage);
    }

    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.symbols.get(&node).copied()
    }

    pub fn type_of(&self, node: NodeId) -> Option<&TypeUsage> {
        self.types.get(&node)
    }

    /// The symbol of a node that an earlier pass must have bound.
    pub fn require_symbol(&self, node: NodeId) -> Result<SymbolId, ResolveError> {
        self.symbol_of(node).ok_or_else(|| ResolveError::MissingBinding {
            node: node.to_string(),
            what: "symbol",
        })
    }

    /// The type of a node that an earlier pass must have bound.
    pub fn require_type(&self, node: NodeId) -> Result<&TypeUsage, ResolveError> {
        self.type_of(node).ok_or_else(|| ResolveError::MissingBinding {
            node: node.to_string(),
            what: "type",
        })
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_parser::FileId;
    use marlin_registry::ScopeTree;

    #[test]
    fn unbound_reads_are_errors() {
        let bindings = Bindings::new();
        let node = NodeId::new(FileId(1), 4);
        assert!(bindings.symbol_of(node).is_none());
        assert_eq!(
            bindings.require_type(node),
            Err(ResolveError::MissingBinding {
                node: "#1:4".into(),
                what: "type",
            })
        );
    }

    #[test]
    fn bound_values_are_returned() {
        let tree = ScopeTree::new();
        let mut bindings = Bindings::new();
        let node = NodeId::new(FileId(0), 0);
        bindings.bind_symbol(node, tree.root());
        bindings.bind_type(node, TypeUsage::void());
        assert_eq!(bindings.require_symbol(node), Ok(tree.root()));
        assert!(bindings.require_type(node).unwrap().is_void());
        assert_eq!(bindings.symbol_count(), 1);
        assert_eq!(bindings.type_count(), 1);
    }
}
