//! Symbols: the semantic side of declarations.
//!
//! A symbol is the primary symbol of exactly one scope, so a symbol is
//! addressed by the id of the scope it opened ([`SymbolId`]).

use std::fmt;

use marlin_core::{Accessibility, SetAccessibility, SourceLocation};

use crate::scope_tree::ScopeId;
use crate::type_usage::TypeUsage;

/// Identifies a symbol by the scope it is the primary symbol of.
pub type SymbolId = ScopeId;

/// A declared entity.
///
/// Constructors (and extern constructor mappings) are unnamed; every other
/// symbol carries a name and takes part in duplicate detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: Option<String>,
    pub accessibility: Accessibility,
    pub location: Option<SourceLocation>,
    pub kind: SymbolKind,
}

impl Symbol {
    fn named(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: Some(name.into()),
            accessibility: Accessibility::Public,
            location: None,
            kind,
        }
    }

    /// A module symbol, named by the module's full name (`a::b`).
    pub fn module(full_name: impl Into<String>) -> Self {
        Self::named(full_name, SymbolKind::Module)
    }

    /// A class symbol, named by its qualified name (`module::Type`).
    pub fn class(qualified_name: impl Into<String>, class: ClassTypeSymbol) -> Self {
        Self::named(qualified_name, SymbolKind::ClassType(class))
    }

    pub fn structure(qualified_name: impl Into<String>) -> Self {
        Self::named(qualified_name, SymbolKind::StructType)
    }

    pub fn extern_type(qualified_name: impl Into<String>, native_type_name: Option<String>) -> Self {
        Self::named(qualified_name, SymbolKind::ExternType { native_type_name })
    }

    pub fn generic_param(name: impl Into<String>, owner: SymbolId, position: usize) -> Self {
        Self::named(name, SymbolKind::GenericParamType { owner, position })
    }

    pub fn method(name: impl Into<String>, method: MethodSymbol) -> Self {
        Self::named(name, SymbolKind::Method(method))
    }

    pub fn constructor() -> Self {
        Self {
            name: None,
            accessibility: Accessibility::Public,
            location: None,
            kind: SymbolKind::Constructor { params: Vec::new() },
        }
    }

    /// An extern method mapping; constructor mappings are unnamed.
    pub fn extern_method(name: Option<String>, method: ExternMethodSymbol) -> Self {
        Self {
            name,
            accessibility: Accessibility::Public,
            location: None,
            kind: SymbolKind::ExternMethod(method),
        }
    }

    pub fn property(name: impl Into<String>, property: PropertySymbol) -> Self {
        Self::named(name, SymbolKind::Property(property))
    }

    pub fn variable(name: impl Into<String>, variable: VariableSymbol) -> Self {
        Self::named(name, SymbolKind::Variable(variable))
    }

    /// Set the declared accessibility.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Set the declaration site.
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// The symbol's name, or `""` for unnamed symbols.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Does this symbol carry exactly this name?
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn tag(&self) -> SymbolTag {
        self.kind.tag()
    }

    /// Types are the symbols a type reference may resolve to.
    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::ClassType(_)
                | SymbolKind::StructType
                | SymbolKind::ExternType { .. }
                | SymbolKind::GenericParamType { .. }
        )
    }

    /// Variables and properties: the things a bare name reads.
    pub fn is_value(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable(_) | SymbolKind::Property(_))
    }

    /// Methods and extern methods that can be called by name.
    pub fn is_callable(&self) -> bool {
        match &self.kind {
            SymbolKind::Method(_) => true,
            SymbolKind::ExternMethod(method) => !method.is_constructor,
            _ => false,
        }
    }

    /// Whether the member belongs to the type rather than an instance.
    ///
    /// Returns `None` for symbols that are not members.
    pub fn is_static_member(&self) -> Option<bool> {
        match &self.kind {
            SymbolKind::Method(method) => Some(method.is_static),
            SymbolKind::ExternMethod(method) => Some(method.is_static),
            SymbolKind::Property(property) => Some(property.is_static),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassTypeSymbol> {
        match &self.kind {
            SymbolKind::ClassType(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassTypeSymbol> {
        match &mut self.kind {
            SymbolKind::ClassType(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableSymbol> {
        match &self.kind {
            SymbolKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut VariableSymbol> {
        match &mut self.kind {
            SymbolKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertySymbol> {
        match &self.kind {
            SymbolKind::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Parameter symbols of methods, constructors and extern methods.
    pub fn params(&self) -> &[SymbolId] {
        match &self.kind {
            SymbolKind::Method(method) => &method.params,
            SymbolKind::Constructor { params } => params,
            SymbolKind::ExternMethod(method) => &method.params,
            _ => &[],
        }
    }

    /// Mutable access to the parameter list of a callable symbol.
    pub fn params_mut(&mut self) -> Option<&mut Vec<SymbolId>> {
        match &mut self.kind {
            SymbolKind::Method(method) => Some(&mut method.params),
            SymbolKind::Constructor { params } => Some(params),
            SymbolKind::ExternMethod(method) => Some(&mut method.params),
            _ => None,
        }
    }

    /// The return type of a callable, once resolved.
    pub fn return_type(&self) -> Option<&TypeUsage> {
        match &self.kind {
            SymbolKind::Method(method) => method.return_type.as_ref(),
            SymbolKind::ExternMethod(method) => method.return_type.as_ref(),
            _ => None,
        }
    }

    /// The value type of a variable or property, once resolved.
    pub fn value_type(&self) -> Option<&TypeUsage> {
        match &self.kind {
            SymbolKind::Variable(variable) => variable.ty.as_ref(),
            SymbolKind::Property(property) => property.ty.as_ref(),
            _ => None,
        }
    }
}

/// What a symbol declares.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Module,
    ClassType(ClassTypeSymbol),
    StructType,
    ExternType {
        native_type_name: Option<String>,
    },
    /// A generic parameter of `owner`, at `position` in its parameter list.
    GenericParamType {
        owner: SymbolId,
        position: usize,
    },
    Method(MethodSymbol),
    Constructor {
        params: Vec<SymbolId>,
    },
    ExternMethod(ExternMethodSymbol),
    Property(PropertySymbol),
    Variable(VariableSymbol),
}

impl SymbolKind {
    pub fn tag(&self) -> SymbolTag {
        match self {
            SymbolKind::Module => SymbolTag::Module,
            SymbolKind::ClassType(_) => SymbolTag::ClassType,
            SymbolKind::StructType => SymbolTag::StructType,
            SymbolKind::ExternType { .. } => SymbolTag::ExternType,
            SymbolKind::GenericParamType { .. } => SymbolTag::GenericParamType,
            SymbolKind::Method(_) => SymbolTag::Method,
            SymbolKind::Constructor { .. } => SymbolTag::Constructor,
            SymbolKind::ExternMethod(_) => SymbolTag::ExternMethod,
            SymbolKind::Property(_) => SymbolTag::Property,
            SymbolKind::Variable(_) => SymbolTag::Variable,
        }
    }
}

/// Fieldless mirror of [`SymbolKind`] for kind checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTag {
    Module,
    ClassType,
    StructType,
    ExternType,
    GenericParamType,
    Method,
    Constructor,
    ExternMethod,
    Property,
    Variable,
}

impl SymbolTag {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolTag::Module => "module",
            SymbolTag::ClassType => "class",
            SymbolTag::StructType => "struct",
            SymbolTag::ExternType => "extern type",
            SymbolTag::GenericParamType => "generic parameter",
            SymbolTag::Method => "method",
            SymbolTag::Constructor => "constructor",
            SymbolTag::ExternMethod => "extern method",
            SymbolTag::Property => "property",
            SymbolTag::Variable => "variable",
        }
    }
}

impl fmt::Display for SymbolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassTypeSymbol {
    pub generic_param_names: Vec<String>,
    pub is_static: bool,
    /// Resolved during the main pass; `None` until then or when absent.
    pub base_type: Option<TypeUsage>,
}

impl ClassTypeSymbol {
    pub fn is_generic(&self) -> bool {
        !self.generic_param_names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodSymbol {
    pub is_static: bool,
    pub return_type: Option<TypeUsage>,
    pub params: Vec<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternMethodSymbol {
    pub is_constructor: bool,
    pub is_static: bool,
    pub return_type: Option<TypeUsage>,
    pub params: Vec<SymbolId>,
    /// Types of the arguments handed to the native function.
    pub passed_args: Vec<TypeUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySymbol {
    pub ty: Option<TypeUsage>,
    pub get_accessibility: Accessibility,
    pub set_accessibility: SetAccessibility,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableSymbol {
    pub ty: Option<TypeUsage>,
    pub is_initialized: bool,
    pub mutable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::NodeIndex;

    #[test]
    fn constructors_are_unnamed() {
        let ctor = Symbol::constructor();
        assert!(ctor.name.is_none());
        assert_eq!(ctor.name(), "");
        assert_eq!(ctor.tag(), SymbolTag::Constructor);
        assert!(!ctor.is_callable());
    }

    #[test]
    fn kind_predicates() {
        let owner = NodeIndex::new(3);
        assert!(Symbol::generic_param("T", owner, 0).is_type());
        assert!(Symbol::structure("m::S").is_type());
        assert!(!Symbol::module("m").is_type());

        let var = Symbol::variable("x", VariableSymbol::default());
        assert!(var.is_value());
        assert_eq!(var.is_static_member(), None);

        let method = Symbol::method(
            "Run",
            MethodSymbol {
                is_static: true,
                ..Default::default()
            },
        );
        assert!(method.is_callable());
        assert_eq!(method.is_static_member(), Some(true));
    }

    #[test]
    fn extern_constructor_is_not_callable_by_name() {
        let mapping = Symbol::extern_method(
            None,
            ExternMethodSymbol {
                is_constructor: true,
                ..Default::default()
            },
        );
        assert!(!mapping.is_callable());
        assert_eq!(mapping.tag().as_str(), "extern method");
    }

    #[test]
    fn params_are_shared_across_callables() {
        let mut ctor = Symbol::constructor();
        ctor.params_mut().unwrap().push(NodeIndex::new(7));
        assert_eq!(ctor.params(), &[NodeIndex::new(7)]);
        assert!(Symbol::module("m").params_mut().is_none());
    }
}
