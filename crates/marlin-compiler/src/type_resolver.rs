//! Type resolution for converting written type names to [`TypeUsage`]s.
//!
//! ## Name lookup
//!
//! - `void` is a sentinel and never looked up
//! - `a::b::T` finds module `a::b`, then the type `a::b::T` inside it
//! - an unqualified `T` is, in order: a generic parameter in scope, a type of
//!   the current module, a type of a module named by a `using` directive
//!
//! ## Checks
//!
//! Unknown names, misplaced `?`, and generic arguments that do not fit the
//! named type are reported here; the usage degrades to unknown (or drops its
//! arguments) so resolution can continue.

use marlin_core::MessageId;
use marlin_parser::ast::{TypeReference, TypeReferenceKind};
use marlin_registry::{ScopeTree, Symbol, SymbolId, SymbolKind, SymbolTag, TypeUsage, UsedType};
use rustc_hash::FxHashSet;

use crate::context::{ResolverContext, Site};

/// Resolves written type names from one [`Site`].
pub struct TypeResolver<'a> {
    ctx: &'a mut ResolverContext,
    site: &'a Site,
}

impl<'a> TypeResolver<'a> {
    pub fn new(ctx: &'a mut ResolverContext, site: &'a Site) -> Self {
        Self { ctx, site }
    }

    /// Resolve a type reference and bind the result to its node.
    pub fn resolve(&mut self, type_ref: &TypeReference) -> TypeUsage {
        let usage = self.resolve_unbound(type_ref);
        self.ctx.bindings.bind_type(type_ref.id, usage.clone());
        usage
    }

    fn resolve_unbound(&mut self, type_ref: &TypeReference) -> TypeUsage {
        let (full_name, nullable, generic_args) = match &type_ref.kind {
            TypeReferenceKind::Void => return TypeUsage::void(),
            TypeReferenceKind::Named {
                full_name,
                nullable,
                generic_args,
            } => (full_name, *nullable, generic_args),
        };
        let location = type_ref.location.as_ref();

        let Some(symbol) = find_type(self.ctx, self.site, full_name) else {
            self.ctx
                .error(MessageId::UnknownType, format!("Unknown type '{full_name}'"), location);
            // Still surface problems inside the arguments.
            for arg in generic_args {
                self.resolve(arg);
            }
            return TypeUsage::unknown();
        };

        let (is_class, param_count) = match self.ctx.tree.symbol(symbol).map(|s| &s.kind) {
            Some(SymbolKind::ClassType(class)) => (true, class.generic_param_names.len()),
            _ => (false, 0),
        };

        let mut usage = TypeUsage::named(symbol);
        if nullable {
            if is_class {
                usage.nullable = true;
            } else {
                self.ctx.error(
                    MessageId::NullableTypeNotClass,
                    format!("Type '{full_name}' cannot be nullable, only classes can"),
                    location,
                );
            }
        }

        if generic_args.is_empty() {
            return usage;
        }

        if param_count == 0 {
            self.ctx.error(
                MessageId::GenericArgsOnNonGenericType,
                format!("Type '{full_name}' is not generic"),
                location,
            );
            for arg in generic_args {
                self.resolve(arg);
            }
            return usage;
        }

        let args: Vec<TypeUsage> = generic_args.iter().map(|arg| self.resolve_argument(arg)).collect();
        if args.len() != param_count {
            self.ctx.error(
                MessageId::GenericArgsDoNotMatchParams,
                format!(
                    "Type '{full_name}' takes {param_count} generic arguments, got {}",
                    args.len()
                ),
                location,
            );
            return usage;
        }
        usage.with_args(args)
    }

    fn resolve_argument(&mut self, arg: &TypeReference) -> TypeUsage {
        if arg.is_void() {
            self.ctx.error(
                MessageId::InvalidGenericArguments,
                "'void' cannot be used as a generic argument",
                arg.location.as_ref(),
            );
            let usage = TypeUsage::unknown();
            self.ctx.bindings.bind_type(arg.id, usage.clone());
            return usage;
        }
        self.resolve(arg)
    }
}

/// Find the type a (possibly qualified) name refers to from `site`.
///
/// Reports nothing; callers decide whether a miss is an error.
pub fn find_type(ctx: &ResolverContext, site: &Site, full_name: &str) -> Option<SymbolId> {
    let tree = &ctx.tree;
    if let Some(index) = full_name.rfind("::") {
        let module = tree.try_lookup(site.scope, |s| {
            s.tag() == SymbolTag::Module && s.is_named(&full_name[..index])
        })?;
        return type_child(tree, module, full_name);
    }

    let generic_param = tree.try_lookup(site.scope, |s| {
        s.tag() == SymbolTag::GenericParamType && s.is_named(full_name)
    });
    if generic_param.is_some() {
        return generic_param;
    }

    let in_module = |module: SymbolId| -> Option<SymbolId> {
        let qualified = format!("{}::{}", tree.symbol(module)?.name(), full_name);
        type_child(tree, module, &qualified)
    };
    in_module(site.module).or_else(|| site.usings.iter().find_map(|&module| in_module(module)))
}

fn type_child(tree: &ScopeTree, module: SymbolId, qualified_name: &str) -> Option<SymbolId> {
    tree.find_child(module, qualified_name)
        .filter(|&scope| tree.symbol(scope).is_some_and(|s| s.is_type()))
}

/// Outcome of checking a value against a target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignability {
    Assignable,
    Mismatch,
    /// `null` into a type that is not a nullable class.
    NullNotAllowed,
}

/// Can a value of type `value` be stored where `target` is expected?
///
/// Unknown on either side is accepted silently: the error that produced it
/// was already reported.
pub fn check_assignable(tree: &ScopeTree, target: &TypeUsage, value: &TypeUsage) -> Assignability {
    if target.is_unknown() || value.is_unknown() {
        return Assignability::Assignable;
    }
    if value.is_null() {
        let class_target = target
            .symbol()
            .and_then(|id| tree.symbol(id))
            .is_some_and(|s| s.tag() == SymbolTag::ClassType);
        return if class_target && target.nullable {
            Assignability::Assignable
        } else {
            Assignability::NullNotAllowed
        };
    }
    if is_assignable(tree, target, value) {
        Assignability::Assignable
    } else {
        Assignability::Mismatch
    }
}

fn is_assignable(tree: &ScopeTree, target: &TypeUsage, value: &TypeUsage) -> bool {
    match (target.ty, value.ty) {
        (UsedType::Void, UsedType::Void) => true,
        (UsedType::Named(target_id), UsedType::Named(_)) => {
            let mut visited = FxHashSet::default();
            let mut current = Some(value.clone());
            while let Some(candidate) = current {
                let Some(id) = candidate.symbol() else {
                    return false;
                };
                if !visited.insert(id) {
                    return false;
                }
                if id == target_id {
                    return args_assignable(tree, target, &candidate);
                }
                current = base_usage(tree, &candidate);
            }
            false
        }
        (UsedType::Unknown, _) | (_, UsedType::Unknown) => true,
        _ => false,
    }
}

fn args_assignable(tree: &ScopeTree, target: &TypeUsage, value: &TypeUsage) -> bool {
    // A raw usage on either side carries no argument constraints.
    if target.generic_args.is_empty() || value.generic_args.is_empty() {
        return true;
    }
    target.generic_args.len() == value.generic_args.len()
        && target
            .generic_args
            .iter()
            .zip(&value.generic_args)
            .all(|(t, v)| check_assignable(tree, t, v) == Assignability::Assignable)
}

/// The base class of a class usage, with the usage's arguments substituted.
pub fn base_usage(tree: &ScopeTree, usage: &TypeUsage) -> Option<TypeUsage> {
    let class = tree.symbol(usage.symbol()?)?.as_class()?;
    let base = class.base_type.as_ref()?;
    Some(base.substitute(tree, usage))
}

/// Find a member of the type `owner` names, searching its own members and
/// then its base classes.
///
/// Returns the member and the usage of the type it was found on, with the
/// generic arguments that apply there, ready for
/// [`TypeUsage::substitute`].
pub fn find_member(
    tree: &ScopeTree,
    owner: &TypeUsage,
    name: &str,
    predicate: impl Fn(&Symbol) -> bool,
) -> Option<(SymbolId, TypeUsage)> {
    let mut visited = FxHashSet::default();
    let mut current = Some(owner.clone());
    while let Some(candidate) = current {
        let id = candidate.symbol()?;
        if !visited.insert(id) {
            return None;
        }
        let member = tree.children(id).into_iter().find(|&child| {
            tree.symbol(child)
                .is_some_and(|s| s.is_named(name) && predicate(s))
        });
        if let Some(member) = member {
            return Some((member, candidate));
        }
        current = base_usage(tree, &candidate);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_parser::ast::NodeId;
    use marlin_parser::FileId;
    use marlin_registry::{ClassTypeSymbol, PropertySymbol};
    use marlin_core::{Accessibility, SetAccessibility};

    struct Fixture {
        ctx: ResolverContext,
        site: Site,
        int32: SymbolId,
        list: SymbolId,
        animal: SymbolId,
        dog: SymbolId,
    }

    fn class(name: &str, params: &[&str]) -> Symbol {
        Symbol::class(
            name,
            ClassTypeSymbol {
                generic_param_names: params.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    fn fixture() -> Fixture {
        let mut ctx = ResolverContext::new();
        let root = ctx.tree.root();
        let std = ctx.tree.add_symbol(root, Symbol::module("std")).unwrap();
        let int32 = ctx.tree.add_symbol(std, Symbol::structure("std::Int32")).unwrap();
        let list = ctx.tree.add_symbol(std, class("std::List", &["T"])).unwrap();
        ctx.tree.add_symbol(list, Symbol::generic_param("T", list, 0)).unwrap();

        let app = ctx.tree.add_symbol(root, Symbol::module("app")).unwrap();
        let animal = ctx.tree.add_symbol(app, class("app::Animal", &[])).unwrap();
        let dog = ctx.tree.add_symbol(app, class("app::Dog", &[])).unwrap();
        ctx.tree.symbol_mut(dog).unwrap().as_class_mut().unwrap().base_type = Some(TypeUsage::named(animal));

        let site = Site {
            scope: dog,
            module: app,
            usings: vec![std],
        };
        Fixture {
            ctx,
            site,
            int32,
            list,
            animal,
            dog,
        }
    }

    fn named(name: &str, nullable: bool, args: Vec<TypeReference>) -> TypeReference {
        TypeReference::named(NodeId::new(FileId(0), 0), None, name, nullable, args)
    }

    fn resolve(f: &mut Fixture, type_ref: &TypeReference) -> TypeUsage {
        TypeResolver::new(&mut f.ctx, &f.site).resolve(type_ref)
    }

    #[test]
    fn qualified_and_unqualified_names() {
        let mut f = fixture();
        assert_eq!(resolve(&mut f, &named("std::Int32", false, vec![])).symbol(), Some(f.int32));
        // via `using std`
        assert_eq!(resolve(&mut f, &named("Int32", false, vec![])).symbol(), Some(f.int32));
        // current module
        assert_eq!(resolve(&mut f, &named("Animal", false, vec![])).symbol(), Some(f.animal));
        assert!(f.ctx.diagnostics.is_empty());
    }

    #[test]
    fn unknown_type_is_reported() {
        let mut f = fixture();
        let usage = resolve(&mut f, &named("Missing", false, vec![]));
        assert!(usage.is_unknown());
        assert_eq!(f.ctx.diagnostics.count_of(MessageId::UnknownType), 1);

        let usage = resolve(&mut f, &named("nope::Int32", false, vec![]));
        assert!(usage.is_unknown());
        assert_eq!(f.ctx.diagnostics.count_of(MessageId::UnknownType), 2);
    }

    #[test]
    fn generic_arguments_are_checked() {
        let mut f = fixture();
        let ok = resolve(
            &mut f,
            &named("List", true, vec![named("Int32", false, vec![])]),
        );
        assert_eq!(f.ctx.describe(&ok), "std::List<std::Int32>?");

        let wrong_count = resolve(
            &mut f,
            &named(
                "List",
                false,
                vec![named("Int32", false, vec![]), named("Int32", false, vec![])],
            ),
        );
        assert!(wrong_count.generic_args.is_empty());
        assert_eq!(f.ctx.diagnostics.count_of(MessageId::GenericArgsDoNotMatchParams), 1);

        resolve(&mut f, &named("Int32", false, vec![named("Int32", false, vec![])]));
        assert_eq!(f.ctx.diagnostics.count_of(MessageId::GenericArgsOnNonGenericType), 1);

        let void_arg = TypeReference::void(NodeId::new(FileId(0), 1), None);
        resolve(&mut f, &named("List", false, vec![void_arg]));
        assert_eq!(f.ctx.diagnostics.count_of(MessageId::InvalidGenericArguments), 1);
    }

    #[test]
    fn nullable_requires_a_class() {
        let mut f = fixture();
        let usage = resolve(&mut f, &named("Int32", true, vec![]));
        assert!(!usage.nullable);
        assert_eq!(f.ctx.diagnostics.count_of(MessageId::NullableTypeNotClass), 1);
    }

    #[test]
    fn generic_parameter_in_scope() {
        let mut f = fixture();
        f.site.scope = f.list;
        let usage = resolve(&mut f, &named("T", false, vec![]));
        assert!(matches!(
            f.ctx.tree.symbol(usage.symbol().unwrap()).map(|s| &s.kind),
            Some(SymbolKind::GenericParamType { position: 0, .. })
        ));
    }

    #[test]
    fn subclass_and_null_assignability() {
        let f = fixture();
        let tree = &f.ctx.tree;
        let animal = TypeUsage::named(f.animal);
        let dog = TypeUsage::named(f.dog);
        let int32 = TypeUsage::named(f.int32);

        assert_eq!(check_assignable(tree, &animal, &dog), Assignability::Assignable);
        assert_eq!(check_assignable(tree, &dog, &animal), Assignability::Mismatch);
        assert_eq!(check_assignable(tree, &int32, &dog), Assignability::Mismatch);
        assert_eq!(check_assignable(tree, &int32, &TypeUsage::unknown()), Assignability::Assignable);

        assert_eq!(
            check_assignable(tree, &animal.clone().with_nullable(true), &TypeUsage::null()),
            Assignability::Assignable
        );
        assert_eq!(
            check_assignable(tree, &animal, &TypeUsage::null()),
            Assignability::NullNotAllowed
        );
        assert_eq!(
            check_assignable(tree, &int32, &TypeUsage::null()),
            Assignability::NullNotAllowed
        );
    }

    #[test]
    fn members_are_found_on_base_classes() {
        let mut f = fixture();
        let property = |name: &str, ty: TypeUsage| {
            Symbol::property(
                name,
                PropertySymbol {
                    ty: Some(ty),
                    get_accessibility: Accessibility::Public,
                    set_accessibility: SetAccessibility::NoModify,
                    is_static: false,
                },
            )
        };
        let t = f.ctx.tree.find_child(f.list, "T").unwrap();
        let items = f.ctx.tree.add_symbol(f.list, property("First", TypeUsage::named(t))).unwrap();
        let name = f.ctx.tree.add_symbol(f.animal, property("Name", TypeUsage::named(f.int32))).unwrap();
        // Animal : List<Int32>
        f.ctx.tree.symbol_mut(f.animal).unwrap().as_class_mut().unwrap().base_type =
            Some(TypeUsage::named(f.list).with_args(vec![TypeUsage::named(f.int32)]));
        let tree = &f.ctx.tree;
        let dog = TypeUsage::named(f.dog);

        let (found, on) = find_member(tree, &dog, "Name", |s| s.is_value()).unwrap();
        assert_eq!(found, name);
        assert_eq!(on.symbol(), Some(f.animal));

        let (found, on) = find_member(tree, &dog, "First", |s| s.is_value()).unwrap();
        assert_eq!(found, items);
        let ty = tree.symbol(found).unwrap().value_type().unwrap().substitute(tree, &on);
        assert_eq!(ty.describe(tree), "std::Int32");

        assert!(find_member(tree, &dog, "Name", |s| s.is_callable()).is_none());
        assert!(find_member(tree, &dog, "Missing", |_| true).is_none());
    }

    #[test]
    fn generic_arguments_must_match_pairwise() {
        let f = fixture();
        let tree = &f.ctx.tree;
        let of = |arg: SymbolId| TypeUsage::named(f.list).with_args(vec![TypeUsage::named(arg)]);

        assert_eq!(check_assignable(tree, &of(f.animal), &of(f.dog)), Assignability::Assignable);
        assert_eq!(check_assignable(tree, &of(f.int32), &of(f.dog)), Assignability::Mismatch);
    }
}
