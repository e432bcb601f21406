//! Written type names.

use super::node::NodeId;
use marlin_core::SourceLocation;
use std::fmt;

/// A type as written in source: `void`, or a `::`-qualified name with
/// optional generic arguments and an optional `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub kind: TypeReferenceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeReferenceKind {
    Void,
    Named {
        /// Name with module path, e.g. `std::List` or just `List`.
        full_name: String,
        nullable: bool,
        generic_args: Vec<TypeReference>,
    },
}

impl TypeReference {
    pub fn void(id: NodeId, location: Option<SourceLocation>) -> Self {
        Self {
            id,
            location,
            kind: TypeReferenceKind::Void,
        }
    }

    pub fn named(
        id: NodeId,
        location: Option<SourceLocation>,
        full_name: impl Into<String>,
        nullable: bool,
        generic_args: Vec<TypeReference>,
    ) -> Self {
        Self {
            id,
            location,
            kind: TypeReferenceKind::Named {
                full_name: full_name.into(),
                nullable,
                generic_args,
            },
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeReferenceKind::Void)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeReferenceKind::Named { nullable: true, .. })
    }

    /// The written name, `void` for the void type.
    pub fn full_name(&self) -> &str {
        match &self.kind {
            TypeReferenceKind::Void => "void",
            TypeReferenceKind::Named { full_name, .. } => full_name,
        }
    }

    pub fn generic_args(&self) -> &[TypeReference] {
        match &self.kind {
            TypeReferenceKind::Void => &[],
            TypeReferenceKind::Named { generic_args, .. } => generic_args,
        }
    }

    /// Split `a::b::T` into `(Some("a::b"), "T")`.
    pub fn split_module(&self) -> (Option<&str>, &str) {
        let name = self.full_name();
        match name.rfind("::") {
            Some(index) => (Some(&name[..index]), &name[index + 2..]),
            None => (None, name),
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeReferenceKind::Void => f.write_str("void"),
            TypeReferenceKind::Named {
                full_name,
                nullable,
                generic_args,
            } => {
                f.write_str(full_name)?;
                if !generic_args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in generic_args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                if *nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{FileId, NodeIdGenerator};

    #[test]
    fn display_nested_generics() {
        let mut ids = NodeIdGenerator::new(FileId(0));
        let int = TypeReference::named(ids.next_id(), None, "std::Int32", false, vec![]);
        let list = TypeReference::named(ids.next_id(), None, "std::List", true, vec![int]);
        assert_eq!(list.to_string(), "std::List<std::Int32>?");
        assert!(list.is_nullable());
        assert_eq!(TypeReference::void(ids.next_id(), None).to_string(), "void");
    }

    #[test]
    fn split_module_path() {
        let mut ids = NodeIdGenerator::new(FileId(0));
        let qualified = TypeReference::named(ids.next_id(), None, "a::b::T", false, vec![]);
        assert_eq!(qualified.split_module(), (Some("a::b"), "T"));
        let bare = TypeReference::named(ids.next_id(), None, "T", false, vec![]);
        assert_eq!(bare.split_module(), (None, "T"));
    }
}
