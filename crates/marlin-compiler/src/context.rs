//! ResolverContext - state shared by both resolver passes.

use marlin_core::{Diagnostics, MessageId, SourceLocation};
use marlin_registry::{ScopeId, ScopeTree, SymbolId, SymbolTag, TypeUsage};

use crate::bindings::Bindings;

/// Name of the implicit base class.
pub const OBJECT_TYPE: &str = "std::Object";
/// Type of integer literals.
pub const INTEGER_TYPE: &str = "std::Int32";
/// Result type of comparison and logical operators.
pub const BOOLEAN_TYPE: &str = "std::Boolean";

const STD_MODULE: &str = "std";

/// Standard library types the resolver gives meaning to, when defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownTypes {
    pub object: Option<SymbolId>,
    pub integer: Option<SymbolId>,
    pub boolean: Option<SymbolId>,
}

/// Where a name is being resolved from.
#[derive(Debug, Clone)]
pub struct Site {
    /// Innermost scope; lookups start here.
    pub scope: ScopeId,
    /// Module of the enclosing type.
    pub module: ScopeId,
    /// Modules named by the unit's `using` directives.
    pub usings: Vec<ScopeId>,
}

impl Site {
    /// The same site, looking up from a nested scope.
    pub fn within(&self, scope: ScopeId) -> Site {
        Site {
            scope,
            module: self.module,
            usings: self.usings.clone(),
        }
    }
}

/// Scope tree, side tables and diagnostics of one resolver run.
#[derive(Debug, Default)]
pub struct ResolverContext {
    pub tree: ScopeTree,
    pub bindings: Bindings,
    pub diagnostics: Diagnostics,
    pub well_known: WellKnownTypes,
}

impl ResolverContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a severe diagnostic.
    pub fn error(&mut self, id: MessageId, message: impl Into<String>, location: Option<&SourceLocation>) {
        self.diagnostics.error(id, message, location.cloned());
    }

    /// Find a module scope by its full name.
    pub fn module(&self, name: &str) -> Option<ScopeId> {
        self.tree
            .find_child(self.tree.root(), name)
            .filter(|&scope| self.tree.symbol(scope).is_some_and(|s| s.tag() == SymbolTag::Module))
    }

    /// Find a type by its qualified name.
    pub fn qualified_type(&self, module: &str, qualified_name: &str) -> Option<SymbolId> {
        let module = self.module(module)?;
        self.tree
            .find_child(module, qualified_name)
            .filter(|&scope| self.tree.symbol(scope).is_some_and(|s| s.is_type()))
    }

    /// Locate the standard library types. Called once all types are declared.
    pub fn load_well_known_types(&mut self) {
        self.well_known = WellKnownTypes {
            object: self
                .qualified_type(STD_MODULE, OBJECT_TYPE)
                .filter(|&id| self.tree.symbol(id).is_some_and(|s| s.tag() == SymbolTag::ClassType)),
            integer: self.qualified_type(STD_MODULE, INTEGER_TYPE),
            boolean: self.qualified_type(STD_MODULE, BOOLEAN_TYPE),
        };
    }

    /// Usage of a well-known type, or unknown when the type is not defined.
    pub fn well_known_usage(&self, symbol: Option<SymbolId>) -> TypeUsage {
        symbol.map(TypeUsage::named).unwrap_or_else(TypeUsage::unknown)
    }

    pub fn describe(&self, usage: &TypeUsage) -> String {
        usage.describe(&self.tree)
    }

    /// Name of a symbol for messages.
    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.tree.symbol(symbol).map(|s| s.name()).unwrap_or("<anonymous>")
    }
}
