//! Type usages: one use of a type at a particular site.

use crate::scope_tree::ScopeTree;
use crate::symbol::{SymbolId, SymbolKind};

/// The type a usage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsedType {
    Void,
    /// The type of the `null` literal.
    Null,
    /// Produced after an error; never reported again.
    Unknown,
    Named(SymbolId),
}

/// A resolved reference to a type, with the generic arguments supplied at
/// the use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeUsage {
    pub ty: UsedType,
    pub nullable: bool,
    pub generic_args: Vec<TypeUsage>,
    /// The usage names the type itself (`std::Console.Write()`), not a value of it.
    pub referenced_statically: bool,
}

impl TypeUsage {
    fn of(ty: UsedType) -> Self {
        Self {
            ty,
            nullable: false,
            generic_args: Vec::new(),
            referenced_statically: false,
        }
    }

    pub fn void() -> Self {
        Self::of(UsedType::Void)
    }

    pub fn null() -> Self {
        Self::of(UsedType::Null)
    }

    pub fn unknown() -> Self {
        Self::of(UsedType::Unknown)
    }

    pub fn named(symbol: SymbolId) -> Self {
        Self::of(UsedType::Named(symbol))
    }

    pub fn with_args(mut self, generic_args: Vec<TypeUsage>) -> Self {
        self.generic_args = generic_args;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn statically(mut self) -> Self {
        self.referenced_statically = true;
        self
    }

    pub fn is_void(&self) -> bool {
        self.ty == UsedType::Void
    }

    pub fn is_null(&self) -> bool {
        self.ty == UsedType::Null
    }

    pub fn is_unknown(&self) -> bool {
        self.ty == UsedType::Unknown
    }

    /// The named symbol, if any.
    pub fn symbol(&self) -> Option<SymbolId> {
        match self.ty {
            UsedType::Named(id) => Some(id),
            _ => None,
        }
    }

    /// Render the usage as source would spell it, e.g. `std::List<std::Int32>?`.
    ///
    /// Generic parameters print under their own name. Run [`TypeUsage::substitute`]
    /// first to describe a member as seen through a concrete owner.
    pub fn describe(&self, tree: &ScopeTree) -> String {
        let mut out = String::new();
        self.write_to(tree, &mut out);
        out
    }

    fn write_to(&self, tree: &ScopeTree, out: &mut String) {
        match self.ty {
            UsedType::Void => out.push_str("void"),
            UsedType::Null => out.push_str("null"),
            UsedType::Unknown => out.push_str("<unknown>"),
            UsedType::Named(id) => {
                out.push_str(tree.symbol(id).map(|s| s.name()).unwrap_or("<missing>"))
            }
        }
        if !self.generic_args.is_empty() {
            out.push('<');
            for (i, arg) in self.generic_args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                arg.write_to(tree, out);
            }
            out.push('>');
        }
        if self.nullable {
            out.push('?');
        }
    }

    /// Replace generic parameters of the class named by `owner_usage` with
    /// the arguments `owner_usage` supplies at the same positions.
    ///
    /// The walk follows `self` structurally; arguments taken from
    /// `owner_usage` are inserted as-is and never substituted again.
    /// Parameters of other classes, or without a matching argument, are
    /// left in place.
    pub fn substitute(&self, tree: &ScopeTree, owner_usage: &TypeUsage) -> TypeUsage {
        if let Some(arg) = self.bound_argument(tree, owner_usage) {
            let mut replaced = arg.clone();
            replaced.nullable |= self.nullable;
            return replaced;
        }

        TypeUsage {
            ty: self.ty,
            nullable: self.nullable,
            generic_args: self
                .generic_args
                .iter()
                .map(|arg| arg.substitute(tree, owner_usage))
                .collect(),
            referenced_statically: self.referenced_statically,
        }
    }

    fn bound_argument<'a>(&self, tree: &ScopeTree, owner_usage: &'a TypeUsage) -> Option<&'a TypeUsage> {
        let id = self.symbol()?;
        match tree.symbol(id).map(|s| &s.kind) {
            Some(SymbolKind::GenericParamType { owner, position })
                if owner_usage.symbol() == Some(*owner) =>
            {
                owner_usage.generic_args.get(*position)
            }
            _ => None,
        }
    }
}
