//! Scope Tree - hierarchical storage for all symbols.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `ScopeData` (the scope's primary symbol, if any)
//! - Edges: `Contains(order)` from parent to child
//!
//! Every declaration opens a scope: the root holds modules, a module holds
//! its types, a type holds its members and generic parameters, a method
//! holds its parameters and locals. Re-parenting a scope is an edge update.

use marlin_core::ScopeError;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::symbol::{Symbol, SymbolTag};

/// Index of a scope in the tree.
pub type ScopeId = NodeIndex;

/// Edge types in the scope graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEdge {
    /// Parent contains child. The number orders siblings by insertion.
    Contains(u32),
}

/// Data stored in each scope node.
#[derive(Debug, Default)]
pub struct ScopeData {
    /// The declaration that opened this scope.
    pub symbol: Option<Symbol>,
}

/// The scope arena.
#[derive(Debug)]
pub struct ScopeTree {
    graph: DiGraph<ScopeData, ScopeEdge>,
    root: ScopeId,
    next_order: u32,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the (symbol-less) root scope.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(ScopeData::default());
        Self {
            graph,
            root,
            next_order: 0,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Number of scopes, detached ones included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, scope: ScopeId) -> bool {
        self.graph.node_weight(scope).is_some()
    }

    fn check(&self, scope: ScopeId) -> Result<(), ScopeError> {
        if self.contains(scope) {
            Ok(())
        } else {
            Err(ScopeError::InvalidScope {
                index: scope.index(),
            })
        }
    }

    /// The primary symbol of a scope.
    pub fn symbol(&self, scope: ScopeId) -> Option<&Symbol> {
        self.graph.node_weight(scope)?.symbol.as_ref()
    }

    pub fn symbol_mut(&mut self, scope: ScopeId) -> Option<&mut Symbol> {
        self.graph.node_weight_mut(scope)?.symbol.as_mut()
    }

    /// Find the parent of a scope. The root and detached scopes have none.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.graph
            .edges_directed(scope, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    /// Direct children in insertion order.
    pub fn children(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut edges: Vec<(u32, ScopeId)> = self
            .graph
            .edges(scope)
            .map(|edge| {
                let ScopeEdge::Contains(order) = *edge.weight();
                (order, edge.target())
            })
            .collect();
        edges.sort_unstable_by_key(|(order, _)| *order);
        edges.into_iter().map(|(_, child)| child).collect()
    }

    /// Find a direct child by the name of its primary symbol.
    pub fn find_child(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.children(scope)
            .into_iter()
            .find(|&child| self.symbol(child).is_some_and(|s| s.is_named(name)))
    }

    /// Create a scope with no parent.
    pub fn new_detached(&mut self, symbol: Option<Symbol>) -> ScopeId {
        self.graph.add_node(ScopeData { symbol })
    }

    /// Add a symbol as a new child scope of `parent`.
    ///
    /// Fails if a sibling already carries the same name.
    pub fn add_symbol(&mut self, parent: ScopeId, symbol: Symbol) -> Result<ScopeId, ScopeError> {
        self.check(parent)?;
        if let Some(name) = symbol.name.as_deref() {
            self.ensure_unique(parent, name, None)?;
        }
        let child = self.graph.add_node(ScopeData {
            symbol: Some(symbol),
        });
        self.link(parent, child);
        Ok(child)
    }

    /// Move an existing scope (with everything below it) under `parent`.
    pub fn add_scope(&mut self, parent: ScopeId, scope: ScopeId) -> Result<(), ScopeError> {
        self.check(parent)?;
        self.check(scope)?;
        if scope == parent || self.is_ancestor(scope, parent) {
            return Err(ScopeError::Cycle {
                index: scope.index(),
            });
        }
        if let Some(name) = self.symbol(scope).and_then(|s| s.name.clone()) {
            self.ensure_unique(parent, &name, Some(scope))?;
        }
        self.detach(scope);
        self.link(parent, scope);
        Ok(())
    }

    /// Cut a scope loose from its parent. Its subtree stays intact.
    pub fn detach(&mut self, scope: ScopeId) {
        // Edge removal reindexes the last edge, so re-query after each one.
        loop {
            let Some(edge) = self
                .graph
                .edges_directed(scope, Direction::Incoming)
                .next()
                .map(|edge| edge.id())
            else {
                break;
            };
            self.graph.remove_edge(edge);
        }
    }

    /// Move every child of `source` under `target`, keeping their order.
    ///
    /// Checks all names before moving anything, so a failure leaves both
    /// scopes untouched.
    pub fn take_children_from(&mut self, target: ScopeId, source: ScopeId) -> Result<(), ScopeError> {
        self.check(target)?;
        self.check(source)?;
        if target == source {
            return Ok(());
        }
        if self.is_ancestor(source, target) {
            return Err(ScopeError::Cycle {
                index: source.index(),
            });
        }
        let moved = self.children(source);
        for &child in &moved {
            if let Some(name) = self.symbol(child).and_then(|s| s.name.as_deref()) {
                self.ensure_unique(target, name, None)?;
            }
        }
        for child in moved {
            self.detach(child);
            self.link(target, child);
        }
        Ok(())
    }

    /// Is `ancestor` a strict ancestor of `scope`?
    pub fn is_ancestor(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        let mut current = self.parent(scope);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Look a symbol up starting at `from`: its children, then its own
    /// primary symbol, then the same search from its parent.
    pub fn try_lookup(&self, from: ScopeId, predicate: impl Fn(&Symbol) -> bool) -> Option<ScopeId> {
        let mut current = Some(from);
        while let Some(scope) = current {
            for child in self.children(scope) {
                if self.symbol(child).is_some_and(&predicate) {
                    return Some(child);
                }
            }
            if self.symbol(scope).is_some_and(&predicate) {
                return Some(scope);
            }
            current = self.parent(scope);
        }
        None
    }

    /// Like [`try_lookup`](Self::try_lookup), for lookups that must succeed.
    pub fn lookup(&self, from: ScopeId, predicate: impl Fn(&Symbol) -> bool) -> Result<ScopeId, ScopeError> {
        self.check(from)?;
        self.try_lookup(from, predicate).ok_or_else(|| ScopeError::NotFound {
            what: format!("matching symbol from scope {}", from.index()),
        })
    }

    pub fn try_lookup_name(&self, from: ScopeId, name: &str) -> Option<ScopeId> {
        self.try_lookup(from, |s| s.is_named(name))
    }

    pub fn lookup_name(&self, from: ScopeId, name: &str) -> Result<ScopeId, ScopeError> {
        self.check(from)?;
        self.try_lookup_name(from, name).ok_or_else(|| ScopeError::NotFound {
            what: format!("'{name}'"),
        })
    }

    /// Look up a name that must resolve to a symbol of kind `expected`.
    pub fn lookup_kind(&self, from: ScopeId, name: &str, expected: SymbolTag) -> Result<ScopeId, ScopeError> {
        let found = self.lookup_name(from, name)?;
        let tag = self
            .symbol(found)
            .map(|s| s.tag())
            .ok_or(ScopeError::InvalidScope {
                index: found.index(),
            })?;
        if tag != expected {
            return Err(ScopeError::KindMismatch {
                name: name.to_string(),
                expected: expected.as_str(),
                found: tag.as_str(),
            });
        }
        Ok(found)
    }

    fn ensure_unique(&self, parent: ScopeId, name: &str, moving: Option<ScopeId>) -> Result<(), ScopeError> {
        match self.find_child(parent, name) {
            Some(existing) if Some(existing) != moving => Err(ScopeError::AlreadyExists {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn link(&mut self, parent: ScopeId, child: ScopeId) {
        let order = self.next_order;
        self.next_order += 1;
        self.graph.add_edge(parent, child, ScopeEdge::Contains(order));
    }
}
