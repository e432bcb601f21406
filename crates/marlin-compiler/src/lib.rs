//! Marlin semantic resolver.
//!
//! A 2-pass resolver over the merged compilation units of a program.
//!
//! ## Architecture
//!
//! - **Pass 1 (Declaration skeleton)**: register every module, type, generic
//!   parameter and member in the scope tree, from syntax only
//! - **Pass 2 (Main resolution)**: resolve all signatures, then type check
//!   every body
//!
//! Resolved facts are not written into the AST. They are recorded in
//! [`Bindings`], keyed by node id.
//!
//! ## Modules
//!
//! - [`bindings`]: Node id to symbol and node id to type side tables
//! - [`context`]: Shared resolver state and well-known types
//! - [`passes`]: The declaration and resolution passes
//! - [`return_checker`]: Return path analysis
//! - [`type_resolver`]: Type references, assignability and member lookup

pub mod bindings;
pub mod context;
pub mod passes;
pub mod return_checker;
pub mod type_resolver;

pub use bindings::Bindings;
pub use context::{ResolverContext, Site, WellKnownTypes};
pub use passes::{DeclarationOutput, DeclarationPass, ResolutionOutput, ResolutionPass};
pub use return_checker::ReturnChecker;
pub use type_resolver::{Assignability, TypeResolver};

use marlin_core::{Diagnostics, ResolveError};
use marlin_parser::ast::CompilationUnit;
use marlin_registry::{ScopeId, ScopeTree};
use tracing::info;

/// Where a [`Resolver`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    DeclarationSkeleton,
    MainResolution,
    Finished,
}

/// Everything the resolver learned about a program.
#[derive(Debug)]
pub struct Resolution {
    pub scopes: ScopeTree,
    pub root: ScopeId,
    pub bindings: Bindings,
    pub diagnostics: Diagnostics,
}

/// Runs both passes, once each, in order.
///
/// # Example
///
/// ```
/// use marlin_compiler::Resolver;
/// use marlin_parser::{FileId, Parser};
///
/// let parsed = Parser::parse_source(
///     "module app; public class Main { public static void Run() { } }",
///     "main.mn",
///     FileId(0),
/// );
/// let units: Vec<_> = parsed.unit.into_iter().collect();
///
/// let resolution = Resolver::new().run(&units).unwrap();
/// assert!(resolution.diagnostics.is_empty());
/// ```
#[derive(Debug)]
pub struct Resolver {
    ctx: ResolverContext,
    state: ResolverState,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            ctx: ResolverContext::new(),
            state: ResolverState::DeclarationSkeleton,
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Pass 1. Must be the first step.
    pub fn declare(&mut self, units: &[CompilationUnit]) -> Result<DeclarationOutput, ResolveError> {
        self.expect_state(ResolverState::DeclarationSkeleton)?;
        let output = DeclarationPass::new(&mut self.ctx).run(units)?;
        info!(
            modules = output.modules_declared,
            types = output.types_declared,
            members = output.members_declared,
            diagnostics = self.ctx.diagnostics.len(),
            "declaration pass finished"
        );
        self.state = ResolverState::MainResolution;
        Ok(output)
    }

    /// Pass 2. Must follow [`Resolver::declare`] over the same units.
    pub fn resolve(&mut self, units: &[CompilationUnit]) -> Result<ResolutionOutput, ResolveError> {
        self.expect_state(ResolverState::MainResolution)?;
        let output = ResolutionPass::new(&mut self.ctx).run(units)?;
        info!(
            types = output.types_resolved,
            bodies = output.bodies_resolved,
            diagnostics = self.ctx.diagnostics.len(),
            "resolution pass finished"
        );
        self.state = ResolverState::Finished;
        Ok(output)
    }

    /// Hand out the results of a finished run.
    pub fn finish(self) -> Result<Resolution, ResolveError> {
        self.expect_state(ResolverState::Finished)?;
        let root = self.ctx.tree.root();
        Ok(Resolution {
            scopes: self.ctx.tree,
            root,
            bindings: self.ctx.bindings,
            diagnostics: self.ctx.diagnostics,
        })
    }

    /// Run both passes over `units`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, units: &[CompilationUnit]) -> Result<Resolution, ResolveError> {
        self.declare(units)?;
        self.resolve(units)?;
        self.finish()
    }

    fn expect_state(&self, expected: ResolverState) -> Result<(), ResolveError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ResolveError::internal(format!(
                "resolver is in state {:?}, expected {:?}",
                self.state, expected
            )))
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_core::MessageId;
    use marlin_parser::ast::{ExpressionKind, FileId, Member, Parser, Statement, TypeDefinition};
    use marlin_registry::{SymbolKind, UsedType};

    const STD: &str = "
        module std;
        public class Object { }
        public struct Int32 { }
        public struct Boolean { }
    ";

    fn parse_all(sources: &[&str]) -> Vec<CompilationUnit> {
        sources
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let parsed = Parser::parse_source(text, format!("file{i}.mn"), FileId(i as u32));
                assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
                parsed.unit.unwrap()
            })
            .collect()
    }

    fn resolve(sources: &[&str]) -> (Vec<CompilationUnit>, Resolution) {
        let units = parse_all(sources);
        let resolution = Resolver::new().run(&units).unwrap();
        (units, resolution)
    }

    fn method_body(unit: &CompilationUnit, type_index: usize, member_index: usize) -> &[Statement] {
        match &unit.types[type_index].members()[member_index] {
            Member::Method(method) => &method.body.statements,
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn states_advance_in_order() {
        let units = parse_all(&[STD]);
        let mut resolver = Resolver::new();
        assert_eq!(resolver.state(), ResolverState::DeclarationSkeleton);
        assert!(resolver.resolve(&units).is_err());

        resolver.declare(&units).unwrap();
        assert_eq!(resolver.state(), ResolverState::MainResolution);
        assert!(resolver.declare(&units).is_err());

        resolver.resolve(&units).unwrap();
        assert_eq!(resolver.state(), ResolverState::Finished);
        let resolution = resolver.finish().unwrap();
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn finish_before_running_fails() {
        assert!(matches!(
            Resolver::new().finish(),
            Err(ResolveError::Internal { .. })
        ));
    }

    #[test]
    fn argument_count_mismatch_still_types_the_call() {
        let app = "module app; using std;
            public class Program {
                public Int32 Sum(Int32 a, Int32 b, Int32 c) { return a; }
                public void Run() { Int32 total = Sum(1, 2); Int32 after = missing; }
            }";
        let (units, resolution) = resolve(&[STD, app]);
        let diagnostics = &resolution.diagnostics;
        assert_eq!(diagnostics.count_of(MessageId::ArgumentCountMismatch), 1, "{diagnostics}");
        // The statement after the bad call is still resolved.
        assert_eq!(diagnostics.count_of(MessageId::VariableNotFound), 1);
        assert_eq!(diagnostics.len(), 2);

        let Statement::LocalVariable(total) = &method_body(&units[1], 0, 1)[0] else {
            panic!("expected local");
        };
        let call = total.initializer.as_ref().unwrap();
        let call_type = resolution.bindings.type_of(call.id).unwrap();
        let int = resolution.bindings.symbol_of(units[0].types[1].id());
        assert_eq!(call_type.symbol(), int);
    }

    #[test]
    fn uninitialized_reads_once_each() {
        let app = "module app; using std;
            public class Program {
                public static void Main() { Int32 x; Int32 y = x; Int32 z = x; x = 1; Int32 w = x; }
            }";
        let (_, resolution) = resolve(&[STD, app]);
        assert_eq!(
            resolution.diagnostics.count_of(MessageId::UninitializedVariableUsage),
            2,
            "{}",
            resolution.diagnostics
        );
        assert_eq!(resolution.diagnostics.len(), 2);
    }

    #[test]
    fn forward_references_across_modules_ignore_order() {
        let first = "module a; using b; public class A { public B Other; public B Make() { return new B(); } }";
        let second = "module b; using a; public class B { public A Back; }";

        for order in [[STD, first, second], [second, first, STD]] {
            let (_, resolution) = resolve(&order);
            assert!(resolution.diagnostics.is_empty(), "{}", resolution.diagnostics);
        }
    }

    #[test]
    fn bindings_connect_names_to_declarations() {
        let app = "module app; using std;
            public class Program {
                public Int32 Count;
                public void Run() { Count = 3; }
            }";
        let (units, resolution) = resolve(&[STD, app]);
        assert!(resolution.diagnostics.is_empty(), "{}", resolution.diagnostics);

        let count_property = resolution
            .bindings
            .symbol_of(units[1].types[0].members()[0].id())
            .unwrap();
        let Statement::Expression(assignment) = &method_body(&units[1], 0, 1)[0] else {
            panic!("expected expression statement");
        };
        assert!(matches!(assignment.kind, ExpressionKind::VariableAssignment { .. }));
        assert_eq!(resolution.bindings.symbol_of(assignment.id), Some(count_property));
    }

    #[test]
    fn classes_get_the_implicit_object_base() {
        let app = "module app; using std; public class Program { } public class Child : Program { }";
        let (units, resolution) = resolve(&[STD, app]);
        assert!(resolution.diagnostics.is_empty(), "{}", resolution.diagnostics);

        let object = resolution.bindings.symbol_of(units[0].types[0].id()).unwrap();
        let program = resolution.bindings.symbol_of(units[1].types[0].id()).unwrap();
        let child = resolution.bindings.symbol_of(units[1].types[1].id()).unwrap();

        let base_of = |id| {
            resolution
                .scopes
                .symbol(id)
                .and_then(|s| s.as_class())
                .and_then(|c| c.base_type.as_ref())
                .map(|b| b.ty)
        };
        assert_eq!(base_of(object), None);
        assert_eq!(base_of(program), Some(UsedType::Named(object)));
        assert_eq!(base_of(child), Some(UsedType::Named(program)));
    }

    #[test]
    fn inheritance_cycles_are_reported() {
        let app = "module app; using std; public class A : B { } public class B : A { }";
        let (_, resolution) = resolve(&[STD, app]);
        assert_eq!(resolution.diagnostics.count_of(MessageId::UnknownType), 1, "{}", resolution.diagnostics);
    }

    #[test]
    fn subclasses_are_assignable_to_bases() {
        let app = "module app; using std;
            public class Animal { }
            public class Dog : Animal { }
            public class Zoo {
                public Animal Keep(Dog dog) { Animal a = dog; Object o = dog; return dog; }
                public Dog Wrong(Animal animal) { return animal; }
            }";
        let (_, resolution) = resolve(&[STD, app]);
        let diagnostics = &resolution.diagnostics;
        assert_eq!(diagnostics.count_of(MessageId::ReturningInvalidType), 1, "{diagnostics}");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn return_rules() {
        let app = "module app; using std;
            public class Program {
                public void A() { return 1; }
                public Int32 B() { return; }
                public Int32 C() { Int32 x = 1; }
                public Int32 D() { { return 1; } }
                public Program E() { return null; }
                public Program? F() { return null; }
            }";
        let (_, resolution) = resolve(&[STD, app]);
        let diagnostics = &resolution.diagnostics;
        assert_eq!(diagnostics.count_of(MessageId::ReturningValueFromVoidMethod), 1, "{diagnostics}");
        assert_eq!(diagnostics.count_of(MessageId::ReturningVoidFromNonVoidMethod), 1);
        assert_eq!(diagnostics.count_of(MessageId::NotAllCodePathsReturn), 1);
        assert_eq!(diagnostics.count_of(MessageId::ReturningInvalidType), 1);
        assert_eq!(diagnostics.len(), 4);
    }

    #[test]
    fn comparisons_produce_booleans() {
        let app = "module app; using std;
            public class Program {
                public Boolean Same(Int32 a, Int32 b) { return a == b; }
                public Int32 Mixed(Int32 a, Program p) { return a + p; }
            }";
        let (units, resolution) = resolve(&[STD, app]);
        assert!(resolution.diagnostics.is_empty(), "{}", resolution.diagnostics);

        let Statement::Return(ret) = &method_body(&units[1], 0, 1)[0] else {
            panic!("expected return");
        };
        let sum = ret.value.as_ref().unwrap();
        assert!(resolution.bindings.type_of(sum.id).unwrap().is_unknown());
    }

    #[test]
    fn nullable_and_generic_type_checks() {
        let app = "module app; using std;
            public class Box<T> { public T Value; }
            public class Program {
                public Int32? A;
                public Program<Int32> B;
                public Box<Int32, Int32> C;
                public Box<void> D;
                public Missing E;
            }";
        let (_, resolution) = resolve(&[STD, app]);
        let diagnostics = &resolution.diagnostics;
        assert_eq!(diagnostics.count_of(MessageId::NullableTypeNotClass), 1, "{diagnostics}");
        assert_eq!(diagnostics.count_of(MessageId::GenericArgsOnNonGenericType), 1);
        assert_eq!(diagnostics.count_of(MessageId::GenericArgsDoNotMatchParams), 1);
        assert_eq!(diagnostics.count_of(MessageId::InvalidGenericArguments), 1);
        assert_eq!(diagnostics.count_of(MessageId::UnknownType), 1);
        assert_eq!(diagnostics.len(), 5);
    }

    #[test]
    fn extern_mappings_resolve_their_arguments() {
        let app = "module app; using std;
            public extern Number @i32 {
                public constructor(Int32 v) -> @make(v);
                public static Number Parse(Int32 v) -> @parse(v, w);
            }";
        let (units, resolution) = resolve(&[STD, app]);
        let diagnostics = &resolution.diagnostics;
        assert_eq!(diagnostics.count_of(MessageId::VariableNotFound), 1, "{diagnostics}");

        let TypeDefinition::ExternType(number) = &units[1].types[0] else {
            panic!("expected extern type");
        };
        let parse = resolution.bindings.symbol_of(number.members[1].id()).unwrap();
        let Some(SymbolKind::ExternMethod(symbol)) = resolution.scopes.symbol(parse).map(|s| &s.kind) else {
            panic!("expected extern method");
        };
        assert_eq!(symbol.passed_args.len(), 2);
        assert!(symbol.passed_args[1].is_unknown());
    }
}
