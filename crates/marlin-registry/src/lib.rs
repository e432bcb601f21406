//! Marlin Registry crate.
//!
//! Symbol storage for the semantic resolver:
//! - [`ScopeTree`]: the arena of scopes, one per declaration
//! - [`Symbol`] / [`SymbolKind`]: what each declaration means
//! - [`TypeUsage`]: one use of a type, with its generic arguments

mod scope_tree;
mod symbol;
mod type_usage;

pub use scope_tree::{ScopeData, ScopeEdge, ScopeId, ScopeTree};
pub use symbol::{
    ClassTypeSymbol, ExternMethodSymbol, MethodSymbol, PropertySymbol, Symbol, SymbolId,
    SymbolKind, SymbolTag, VariableSymbol,
};
pub use type_usage::{TypeUsage, UsedType};
