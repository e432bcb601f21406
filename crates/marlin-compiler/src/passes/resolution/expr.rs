//! Expression resolution.
//!
//! Every expression gets a type bound to its node, `unknown` when something
//! it depends on failed. Expressions that name a declaration also get the
//! declaration's symbol bound.

use marlin_core::{MessageId, ResolveError, SourceLocation};
use marlin_parser::ast::{BinaryOperator, Expression, ExpressionKind, TypeReference};
use marlin_registry::{Symbol, SymbolId, SymbolKind, TypeUsage};

use super::body::{BodyResolver, ValueContext};
use crate::type_resolver::{find_member, find_type};

/// What is done with a member reached through `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Call,
    Assign,
}

impl BodyResolver<'_> {
    /// Resolve an expression and bind its type.
    pub(super) fn resolve_expression(&mut self, expr: &Expression) -> Result<TypeUsage, ResolveError> {
        let usage = match &expr.kind {
            ExpressionKind::TypeReference(type_ref) => self.resolve_type(type_ref).statically(),
            ExpressionKind::Integer { .. } => self.ctx.well_known_usage(self.ctx.well_known.integer),
            ExpressionKind::Null => TypeUsage::null(),
            ExpressionKind::BinaryOperator {
                operator,
                left,
                right,
            } => self.resolve_binary(*operator, left, right)?,
            ExpressionKind::MemberAccess {
                target,
                member_name,
            } => self.resolve_member_access(expr, target.as_deref(), member_name)?,
            ExpressionKind::MethodCall {
                target,
                method_name,
                args,
                ..
            } => self.resolve_call(expr, target.as_deref(), method_name, args)?,
            ExpressionKind::VariableAssignment {
                target,
                name,
                value,
            } => self.resolve_assignment(expr, target.as_deref(), name, value)?,
            ExpressionKind::NewClassInitializer {
                type_ref,
                constructor_args,
            } => self.resolve_new(expr, type_ref, constructor_args)?,
        };
        self.ctx.bindings.bind_type(expr.id, usage.clone());
        Ok(usage)
    }

    fn resolve_binary(
        &mut self,
        operator: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<TypeUsage, ResolveError> {
        let left = self.resolve_expression(left)?;
        let right = self.resolve_expression(right)?;
        if operator.is_comparison_or_logical() {
            return Ok(self.ctx.well_known_usage(self.ctx.well_known.boolean));
        }
        let same = !left.is_unknown() && left.ty == right.ty && left.generic_args == right.generic_args;
        Ok(if same {
            TypeUsage {
                referenced_statically: false,
                ..left
            }
        } else {
            TypeUsage::unknown()
        })
    }

    /// Resolve the target of a `.` and check it can have members.
    ///
    /// `None` means the member cannot be looked up; anything worth reporting
    /// has been reported.
    fn resolve_receiver(
        &mut self,
        target: &Expression,
        member: &str,
        access: Access,
    ) -> Result<Option<TypeUsage>, ResolveError> {
        let owner = self.resolve_expression(target)?;
        let location = target.location.as_ref();
        if owner.is_unknown() {
            return Ok(None);
        }
        if owner.is_void() {
            let (id, message) = match access {
                Access::Call => (
                    MessageId::MethodCallOnVoid,
                    format!("Cannot call method '{member}' on void"),
                ),
                Access::Assign => (
                    MessageId::MethodCallOnVoid,
                    format!("Cannot assign property '{member}' on void"),
                ),
                Access::Read => (
                    MessageId::MemberNotFound,
                    format!("Cannot access member '{member}' of void"),
                ),
            };
            self.ctx.error(id, message, location);
            return Ok(None);
        }
        if owner.is_null() {
            self.ctx.error(
                MessageId::MemberNotFound,
                format!("Cannot access member '{member}' of null"),
                location,
            );
            return Ok(None);
        }
        Ok(Some(owner))
    }

    /// Look up a name without a target: locals, parameters and members
    /// visible from the current scope, then inherited members of the
    /// enclosing type.
    ///
    /// Returns the symbol and, for inherited members, the usage of the type
    /// it was found on.
    fn lookup_unqualified(
        &self,
        name: &str,
        predicate: impl Fn(&Symbol) -> bool,
    ) -> Option<(SymbolId, Option<TypeUsage>)> {
        let tree = &self.ctx.tree;
        if let Some(found) = tree.try_lookup(self.site.scope, |s| s.is_named(name) && predicate(s)) {
            return Some((found, None));
        }
        let enclosing = TypeUsage::named(self.enclosing_type);
        find_member(tree, &enclosing, name, predicate).map(|(found, on)| (found, Some(on)))
    }

    /// Type of a variable or property, seen through `owner`'s generic arguments.
    fn value_type_of(&self, symbol: SymbolId, owner: Option<&TypeUsage>) -> TypeUsage {
        let tree = &self.ctx.tree;
        let Some(ty) = tree.symbol(symbol).and_then(|s| s.value_type()) else {
            return TypeUsage::unknown();
        };
        match owner {
            Some(owner) => ty.substitute(tree, owner),
            None => ty.clone(),
        }
    }

    fn resolve_member_access(
        &mut self,
        expr: &Expression,
        target: Option<&Expression>,
        name: &str,
    ) -> Result<TypeUsage, ResolveError> {
        let location = expr.location.as_ref();

        let Some(target) = target else {
            if let Some((found, owner)) = self.lookup_unqualified(name, |s| s.is_value()) {
                self.ctx.bindings.bind_symbol(expr.id, found);
                let uninitialized = self
                    .ctx
                    .tree
                    .symbol(found)
                    .and_then(|s| s.as_variable())
                    .is_some_and(|v| !v.is_initialized);
                if uninitialized {
                    self.ctx.error(
                        MessageId::UninitializedVariableUsage,
                        format!("Variable '{name}' is used before being assigned"),
                        location,
                    );
                }
                return Ok(self.value_type_of(found, owner.as_ref()));
            }

            // `Console.Write()` names a type, not a value.
            if let Some(ty) = find_type(self.ctx, &self.site, name) {
                self.ctx.bindings.bind_symbol(expr.id, ty);
                return Ok(TypeUsage::named(ty).statically());
            }

            self.ctx.error(
                MessageId::VariableNotFound,
                format!("Variable '{name}' not found"),
                location,
            );
            return Ok(TypeUsage::unknown());
        };

        let Some(owner) = self.resolve_receiver(target, name, Access::Read)? else {
            return Ok(TypeUsage::unknown());
        };
        match find_member(&self.ctx.tree, &owner, name, |s| s.is_value()) {
            Some((found, on)) => {
                self.ctx.bindings.bind_symbol(expr.id, found);
                Ok(self.value_type_of(found, Some(&on)))
            }
            None => {
                let message = format!("Type '{}' has no member '{name}'", self.ctx.describe(&owner));
                self.ctx.error(MessageId::MemberNotFound, message, location);
                Ok(TypeUsage::unknown())
            }
        }
    }

    fn resolve_call(
        &mut self,
        expr: &Expression,
        target: Option<&Expression>,
        name: &str,
        args: &[Expression],
    ) -> Result<TypeUsage, ResolveError> {
        let location = expr.location.as_ref();

        let found = match target {
            Some(target) => {
                let Some(owner) = self.resolve_receiver(target, name, Access::Call)? else {
                    self.resolve_args(args)?;
                    return Ok(TypeUsage::unknown());
                };
                match find_member(&self.ctx.tree, &owner, name, |s| s.is_callable()) {
                    Some((method, on)) => {
                        self.check_static_call(method, &owner, name, location);
                        Some((method, on))
                    }
                    None => {
                        let message =
                            format!("Type '{}' has no method '{name}'", self.ctx.describe(&owner));
                        self.ctx.error(MessageId::MemberNotFound, message, location);
                        None
                    }
                }
            }
            None => {
                let enclosing = TypeUsage::named(self.enclosing_type);
                let found = find_member(&self.ctx.tree, &enclosing, name, |s| s.is_callable());
                if found.is_none() {
                    self.ctx.error(
                        MessageId::VariableNotFound,
                        format!("Method '{name}' not found"),
                        location,
                    );
                }
                found
            }
        };

        let arg_types = self.resolve_args(args)?;
        let Some((method, owner)) = found else {
            return Ok(TypeUsage::unknown());
        };
        self.ctx.bindings.bind_symbol(expr.id, method);

        let expected = self.params_of(method).len();
        if expected != args.len() {
            self.ctx.error(
                MessageId::ArgumentCountMismatch,
                format!("Method '{name}' expects {expected} arguments, got {}", args.len()),
                location,
            );
        } else {
            self.check_arguments(method, &owner, args, &arg_types);
        }

        let tree = &self.ctx.tree;
        Ok(tree
            .symbol(method)
            .and_then(|s| s.return_type())
            .map(|ty| ty.substitute(tree, &owner))
            .unwrap_or_else(TypeUsage::unknown))
    }

    fn check_static_call(
        &mut self,
        method: SymbolId,
        owner: &TypeUsage,
        name: &str,
        location: Option<&SourceLocation>,
    ) {
        let is_static = self
            .ctx
            .tree
            .symbol(method)
            .and_then(|s| s.is_static_member())
            .unwrap_or(false);
        let owner_name = self.ctx.describe(owner);
        if owner.referenced_statically && !is_static {
            self.ctx.error(
                MessageId::InstanceMethodCallOnTypeName,
                format!("Cannot call instance method '{name}' on type '{owner_name}'"),
                location,
            );
        } else if !owner.referenced_statically && is_static {
            self.ctx.error(
                MessageId::StaticMethodCallOnInstance,
                format!("Cannot call static method '{name}' on an instance of '{owner_name}'"),
                location,
            );
        }
    }

    fn resolve_assignment(
        &mut self,
        expr: &Expression,
        target: Option<&Expression>,
        name: &str,
        value: &Expression,
    ) -> Result<TypeUsage, ResolveError> {
        let location = expr.location.as_ref();
        let actual = self.resolve_expression(value)?;

        let declared = match target {
            Some(target) => {
                let Some(owner) = self.resolve_receiver(target, name, Access::Assign)? else {
                    return Ok(TypeUsage::unknown());
                };
                let Some((property, on)) = find_member(&self.ctx.tree, &owner, name, |s| s.is_value())
                else {
                    let message = format!("Type '{}' has no member '{name}'", self.ctx.describe(&owner));
                    self.ctx.error(MessageId::MemberNotFound, message, location);
                    return Ok(TypeUsage::unknown());
                };
                self.check_static_assignment(property, &owner, name, location);
                self.ctx.bindings.bind_symbol(expr.id, property);
                self.value_type_of(property, Some(&on))
            }
            None => {
                let Some((found, owner)) = self.lookup_unqualified(name, |s| s.is_value()) else {
                    self.ctx.error(
                        MessageId::VariableNotFound,
                        format!("Variable '{name}' not found"),
                        location,
                    );
                    return Ok(TypeUsage::unknown());
                };
                if let Some(variable) = self.ctx.tree.symbol_mut(found).and_then(|s| s.as_variable_mut()) {
                    variable.is_initialized = true;
                }
                self.ctx.bindings.bind_symbol(expr.id, found);
                self.value_type_of(found, owner.as_ref())
            }
        };

        self.report_mismatch(&declared, &actual, value.location.as_ref(), ValueContext::Assignment);
        Ok(declared)
    }

    fn check_static_assignment(
        &mut self,
        property: SymbolId,
        owner: &TypeUsage,
        name: &str,
        location: Option<&SourceLocation>,
    ) {
        let is_static = self
            .ctx
            .tree
            .symbol(property)
            .and_then(|s| s.is_static_member())
            .unwrap_or(false);
        let owner_name = self.ctx.describe(owner);
        if owner.referenced_statically && !is_static {
            self.ctx.error(
                MessageId::InstancePropertyAssignmentOnTypeName,
                format!("Cannot assign instance property '{name}' through type '{owner_name}'"),
                location,
            );
        } else if !owner.referenced_statically && is_static {
            self.ctx.error(
                MessageId::StaticPropertyAssignmentOnInstance,
                format!("Cannot assign static property '{name}' through an instance of '{owner_name}'"),
                location,
            );
        }
    }

    fn resolve_new(
        &mut self,
        expr: &Expression,
        type_ref: &TypeReference,
        args: &[Expression],
    ) -> Result<TypeUsage, ResolveError> {
        let location = expr.location.as_ref();
        let usage = self.resolve_type(type_ref);
        let arg_types = self.resolve_args(args)?;

        let Some(ty) = usage.symbol() else {
            return Ok(usage);
        };
        if matches!(
            self.ctx.tree.symbol(ty).map(|s| &s.kind),
            Some(SymbolKind::GenericParamType { .. })
        ) {
            self.ctx.error(
                MessageId::GenericParamTypeCannotBeInstantiated,
                format!("Cannot instantiate generic parameter type '{}'", self.ctx.symbol_name(ty)),
                location,
            );
            return Ok(TypeUsage::unknown());
        }

        let constructors = self.constructors_of(ty);
        let matching = constructors
            .iter()
            .copied()
            .find(|&ctor| self.params_of(ctor).len() == args.len());
        match matching {
            Some(ctor) => {
                self.ctx.bindings.bind_symbol(expr.id, ctor);
                self.check_arguments(ctor, &usage, args, &arg_types);
            }
            // Without declared constructors only the implicit empty one exists.
            None if constructors.is_empty() && args.is_empty() => {}
            None => {
                let message = format!(
                    "Type '{}' has no constructor taking {} arguments",
                    self.ctx.describe(&usage),
                    args.len()
                );
                self.ctx.error(MessageId::ArgumentCountMismatch, message, location);
            }
        }
        Ok(usage)
    }

    fn constructors_of(&self, ty: SymbolId) -> Vec<SymbolId> {
        let tree = &self.ctx.tree;
        tree.children(ty)
            .into_iter()
            .filter(|&child| {
                tree.symbol(child).is_some_and(|s| match &s.kind {
                    SymbolKind::Constructor { .. } => true,
                    SymbolKind::ExternMethod(method) => method.is_constructor,
                    _ => false,
                })
            })
            .collect()
    }

    fn params_of(&self, callable: SymbolId) -> Vec<SymbolId> {
        self.ctx
            .tree
            .symbol(callable)
            .map(|s| s.params().to_vec())
            .unwrap_or_default()
    }

    fn resolve_args(&mut self, args: &[Expression]) -> Result<Vec<TypeUsage>, ResolveError> {
        args.iter().map(|arg| self.resolve_expression(arg)).collect()
    }

    /// Check argument types against parameter types; arity already matches.
    fn check_arguments(
        &mut self,
        callable: SymbolId,
        owner: &TypeUsage,
        args: &[Expression],
        arg_types: &[TypeUsage],
    ) {
        for ((arg, actual), param) in args.iter().zip(arg_types).zip(self.params_of(callable)) {
            let expected = self.value_type_of(param, Some(owner));
            self.report_mismatch(&expected, actual, arg.location.as_ref(), ValueContext::Assignment);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Resolver;
    use marlin_core::{Diagnostics, MessageId};
    use marlin_parser::ast::{CompilationUnit, FileId, Parser};

    const STD: &str = "
        module std;
        public class Object { }
        public struct Int32 { }
        public struct Boolean { }
        public static extern Console {
            public static void WriteLine(Int32 value) -> @puts(value);
        }
        public class List<T> {
            public T First;
            public constructor() { }
            public T Get(Int32 index) { return First; }
            public void Add(T item) { }
        }
    ";

    fn analyze(source: &str) -> Diagnostics {
        let units: Vec<CompilationUnit> = [STD, source]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let parsed = Parser::parse_source(text, "test.mn", FileId(i as u32));
                assert_eq!(parsed.diagnostics.severe_count(), 0, "{}", parsed.diagnostics);
                parsed.unit.unwrap()
            })
            .collect();
        Resolver::new().run(&units).unwrap().diagnostics
    }

    fn in_method(statements: &str) -> Diagnostics {
        analyze(&format!(
            "module app; using std;
            public class Program {{
                public Int32 Count;
                public static Int32 Total;
                public void Three(Int32 a, Int32 b, Int32 c) {{ }}
                public static void Helper() {{ }}
                public void Run() {{ {statements} }}
            }}"
        ))
    }

    #[test]
    fn clean_body() {
        let diagnostics = in_method(
            "Int32 a = 1; mut Int32 b; b = a + 2; Three(a, b, 3); Console.WriteLine(a); Helper();",
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");
    }

    #[test]
    fn argument_count_mismatch_is_reported_once() {
        let diagnostics = in_method("Three(1, 2);");
        assert_eq!(diagnostics.len(), 1, "{diagnostics}");
        assert_eq!(diagnostics.count_of(MessageId::ArgumentCountMismatch), 1);
    }

    #[test]
    fn uninitialized_reads_are_reported_per_read() {
        let diagnostics = in_method("Int32 a; Int32 b = a; Three(a, a, 1); a = 2; Int32 c = a;");
        assert_eq!(diagnostics.count_of(MessageId::UninitializedVariableUsage), 3, "{diagnostics}");
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn unknown_names() {
        let diagnostics = in_method("Int32 a = missing; Nope(); Console.Nope(); a = this_is_not_here;");
        assert_eq!(diagnostics.count_of(MessageId::VariableNotFound), 3, "{diagnostics}");
        assert_eq!(diagnostics.count_of(MessageId::MemberNotFound), 1);
    }

    #[test]
    fn static_and_instance_checks() {
        let diagnostics = in_method(
            "Program p = new Program(); p.Helper(); Program.Run(); Program.Count = 1; p.Total = 2; p.Count = 3; Program.Total = 4;",
        );
        assert_eq!(diagnostics.count_of(MessageId::StaticMethodCallOnInstance), 1, "{diagnostics}");
        assert_eq!(diagnostics.count_of(MessageId::InstanceMethodCallOnTypeName), 1);
        assert_eq!(diagnostics.count_of(MessageId::InstancePropertyAssignmentOnTypeName), 1);
        assert_eq!(diagnostics.count_of(MessageId::StaticPropertyAssignmentOnInstance), 1);
        assert_eq!(diagnostics.len(), 4);
    }

    #[test]
    fn generic_members_are_substituted() {
        let diagnostics = in_method(
            "List<Int32> list = new List<Int32>(); Int32 first = list.Get(0); list.Add(first); Int32 f = list.First;",
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let diagnostics = in_method("List<Program> list = new List<Program>(); Int32 x = list.Get(0);");
        assert_eq!(diagnostics.count_of(MessageId::AssignedValueDoesNotMatchType), 1, "{diagnostics}");
    }

    #[test]
    fn assignment_type_checks() {
        let diagnostics = in_method("Int32 a = new Program(); Program p = null; Program? q = null;");
        assert_eq!(diagnostics.count_of(MessageId::AssignedValueDoesNotMatchType), 1, "{diagnostics}");
        assert_eq!(diagnostics.count_of(MessageId::CannotAssignNullToType), 1);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn calls_through_void() {
        let diagnostics = in_method("Helper().Run();");
        assert_eq!(diagnostics.count_of(MessageId::MethodCallOnVoid), 1, "{diagnostics}");
    }

    #[test]
    fn member_use_through_void() {
        let diagnostics = in_method("Helper().Count = 1;");
        assert_eq!(diagnostics.count_of(MessageId::MethodCallOnVoid), 1, "{diagnostics}");
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = in_method("Int32 a = Helper().Count;");
        assert_eq!(diagnostics.count_of(MessageId::MemberNotFound), 1, "{diagnostics}");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn unqualified_members_skip_static_checks() {
        let diagnostics = analyze(
            "module app; using std;
            public class Program {
                public Int32 Count;
                public static Int32 Total;
                public void Run() { }
                public static void Helper() { }
                public static void Main() { Run(); Count = 1; Int32 c = Count; }
                public void Go() { Helper(); Total = 2; }
            }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");
    }

    #[test]
    fn constructor_arity() {
        let diagnostics = in_method("Program p = new Program(1); List<Int32> l = new List<Int32>(1, 2);");
        assert_eq!(diagnostics.count_of(MessageId::ArgumentCountMismatch), 2, "{diagnostics}");
    }

    #[test]
    fn generic_parameters_cannot_be_instantiated() {
        let diagnostics = analyze(
            "module app; using std; public class Box<T> { public T Make() { return new T(); } }",
        );
        assert_eq!(
            diagnostics.count_of(MessageId::GenericParamTypeCannotBeInstantiated),
            1,
            "{diagnostics}"
        );
        assert_eq!(diagnostics.len(), 1);
    }
}
