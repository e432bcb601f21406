//! Resolution Pass (Pass 2) - resolve every type name and every body.
//!
//! Runs two sweeps over the forest:
//!
//! 1. **Signatures**: base classes, property types, return and parameter
//!    types of methods, constructors and extern mappings.
//! 2. **Bodies**: property initializers, method and constructor bodies, and
//!    the arguments extern mappings pass to native code.
//!
//! All signatures are resolved before any body, so a body can call a method
//! declared later in the file, or in another module, and see its types.

mod body;
mod expr;

use marlin_core::{MessageId, ResolveError};
use marlin_parser::ast::{ClassDefinition, CompilationUnit, Member, Parameter, TypeDefinition};
use marlin_registry::{ScopeId, SymbolKind, TypeUsage};
use tracing::debug;

use crate::context::{ResolverContext, Site};
use crate::return_checker::ReturnChecker;
use crate::type_resolver::TypeResolver;

use body::BodyResolver;

/// Output of the resolution pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionOutput {
    pub types_resolved: usize,
    pub bodies_resolved: usize,
}

/// Pass 2: resolve signatures and bodies.
pub struct ResolutionPass<'a> {
    ctx: &'a mut ResolverContext,
    output: ResolutionOutput,
}

impl<'a> ResolutionPass<'a> {
    pub fn new(ctx: &'a mut ResolverContext) -> Self {
        Self {
            ctx,
            output: ResolutionOutput::default(),
        }
    }

    /// Run both sweeps over all units.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, units: &[CompilationUnit]) -> Result<ResolutionOutput, ResolveError> {
        self.ctx.load_well_known_types();

        for unit in units {
            for definition in &unit.types {
                self.resolve_signatures(unit, definition)?;
            }
        }
        debug!(types = self.output.types_resolved, "signatures resolved");

        for unit in units {
            for definition in &unit.types {
                self.resolve_bodies(unit, definition)?;
            }
        }
        debug!(bodies = self.output.bodies_resolved, "bodies resolved");

        Ok(self.output)
    }

    /// The type's scope and the site its names resolve from.
    ///
    /// `None` for duplicate definitions, which the declaration pass left
    /// detached.
    fn type_site(
        &self,
        unit: &CompilationUnit,
        definition: &TypeDefinition,
    ) -> Result<Option<(ScopeId, Site)>, ResolveError> {
        let scope = self.ctx.bindings.require_symbol(definition.id())?;
        let Some(module) = self.ctx.tree.parent(scope) else {
            return Ok(None);
        };
        let usings = unit
            .dependencies
            .iter()
            .filter_map(|dependency| self.ctx.module(&dependency.name))
            .collect();
        Ok(Some((
            scope,
            Site {
                scope,
                module,
                usings,
            },
        )))
    }

    /// The member's scope, or `None` for a detached duplicate.
    fn member_scope(&self, member: &Member) -> Result<Option<ScopeId>, ResolveError> {
        let scope = self.ctx.bindings.require_symbol(member.id())?;
        Ok(self.ctx.tree.parent(scope).map(|_| scope))
    }

    fn resolve_signatures(&mut self, unit: &CompilationUnit, definition: &TypeDefinition) -> Result<(), ResolveError> {
        let Some((scope, site)) = self.type_site(unit, definition)? else {
            return Ok(());
        };

        if let TypeDefinition::Class(class) = definition {
            self.resolve_base(scope, &site, class);
        }

        for member in definition.members() {
            let Some(member_scope) = self.member_scope(member)? else {
                continue;
            };
            match member {
                Member::Property(property) => {
                    let ty = TypeResolver::new(self.ctx, &site).resolve(&property.type_ref);
                    if let Some(SymbolKind::Property(symbol)) = self.kind_mut(member_scope) {
                        symbol.ty = Some(ty);
                    }
                }
                Member::Method(method) => {
                    let ty = TypeResolver::new(self.ctx, &site).resolve(&method.return_type);
                    if let Some(SymbolKind::Method(symbol)) = self.kind_mut(member_scope) {
                        symbol.return_type = Some(ty);
                    }
                    self.resolve_params(&site, &method.params)?;
                }
                Member::Constructor(constructor) => {
                    self.resolve_params(&site, &constructor.params)?;
                }
                Member::ExternMethod(mapping) => {
                    if let Some(mapped_type) = &mapping.mapped_type {
                        let ty = TypeResolver::new(self.ctx, &site).resolve(mapped_type);
                        if let Some(SymbolKind::ExternMethod(symbol)) = self.kind_mut(member_scope) {
                            symbol.return_type = Some(ty);
                        }
                    }
                    self.resolve_params(&site, &mapping.expected_params)?;
                }
            }
        }

        self.output.types_resolved += 1;
        Ok(())
    }

    fn resolve_base(&mut self, scope: ScopeId, site: &Site, class: &ClassDefinition) {
        let base = match &class.base_type {
            Some(type_ref) => {
                let mut usage = TypeResolver::new(self.ctx, site).resolve(type_ref);
                // A nullable base was already reported by the parser.
                usage.nullable = false;
                let cyclic = usage
                    .symbol()
                    .is_some_and(|base| base == scope || self.inherits_from(base, scope));
                if cyclic {
                    let message = format!(
                        "Base type '{}' of '{}' forms an inheritance cycle",
                        self.ctx.describe(&usage),
                        self.ctx.symbol_name(scope)
                    );
                    self.ctx
                        .error(MessageId::UnknownType, message, type_ref.location.as_ref());
                    None
                } else {
                    Some(usage)
                }
            }
            None => self
                .ctx
                .well_known
                .object
                .filter(|&object| object != scope)
                .map(TypeUsage::named),
        };

        if let Some(SymbolKind::ClassType(symbol)) = self.kind_mut(scope) {
            symbol.base_type = base;
        }
    }

    /// Does `class` have `ancestor` somewhere in its resolved base chain?
    fn inherits_from(&self, class: ScopeId, ancestor: ScopeId) -> bool {
        let tree = &self.ctx.tree;
        let mut current = Some(class);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > tree.len() {
                return false;
            }
            current = tree
                .symbol(id)
                .and_then(|s| s.as_class())
                .and_then(|c| c.base_type.as_ref())
                .and_then(|b| b.symbol());
        }
        false
    }

    fn resolve_params(&mut self, site: &Site, params: &[Parameter]) -> Result<(), ResolveError> {
        for param in params {
            let ty = TypeResolver::new(self.ctx, site).resolve(&param.type_ref);
            let scope = self.ctx.bindings.require_symbol(param.id)?;
            if let Some(SymbolKind::Variable(symbol)) = self.kind_mut(scope) {
                symbol.ty = Some(ty.clone());
            }
            self.ctx.bindings.bind_type(param.id, ty);
        }
        Ok(())
    }

    fn resolve_bodies(&mut self, unit: &CompilationUnit, definition: &TypeDefinition) -> Result<(), ResolveError> {
        let Some((scope, site)) = self.type_site(unit, definition)? else {
            return Ok(());
        };

        for member in definition.members() {
            let Some(member_scope) = self.member_scope(member)? else {
                continue;
            };
            match member {
                Member::Property(property) => {
                    let Some(initializer) = &property.initializer else {
                        continue;
                    };
                    let declared = self.declared_type(member_scope);
                    let mut body = BodyResolver::new(self.ctx, site.within(scope), scope, None);
                    body.check_assignment(initializer, &declared)?;
                }
                Member::Method(method) => {
                    let return_type = self.declared_type(member_scope);
                    let mut body = BodyResolver::new(
                        self.ctx,
                        site.within(member_scope),
                        scope,
                        Some(return_type.clone()),
                    );
                    body.resolve_block(&method.body)?;

                    let needs_return = !return_type.is_void() && !return_type.is_unknown();
                    if needs_return && !ReturnChecker::new().all_paths_return(&method.body) {
                        self.ctx.error(
                            MessageId::NotAllCodePathsReturn,
                            format!("Not all code paths of '{}' return a value", method.name),
                            method.location.as_ref(),
                        );
                    }
                }
                Member::Constructor(constructor) => {
                    let mut body = BodyResolver::new(
                        self.ctx,
                        site.within(member_scope),
                        scope,
                        Some(TypeUsage::void()),
                    );
                    body.resolve_block(&constructor.body)?;
                }
                Member::ExternMethod(mapping) => {
                    let mut body = BodyResolver::new(
                        self.ctx,
                        site.within(member_scope),
                        scope,
                        None,
                    );
                    let mut passed = Vec::with_capacity(mapping.passed_args.len());
                    for arg in &mapping.passed_args {
                        passed.push(body.resolve_expression(arg)?);
                    }
                    if let Some(SymbolKind::ExternMethod(symbol)) = self.kind_mut(member_scope) {
                        symbol.passed_args = passed;
                    }
                }
            }
            self.output.bodies_resolved += 1;
        }
        Ok(())
    }

    /// Declared value or return type of a member, unknown if unresolved.
    fn declared_type(&self, member: ScopeId) -> TypeUsage {
        self.ctx
            .tree
            .symbol(member)
            .and_then(|s| s.value_type().or_else(|| s.return_type()))
            .cloned()
            .unwrap_or_else(TypeUsage::unknown)
    }

    fn kind_mut(&mut self, scope: ScopeId) -> Option<&mut SymbolKind> {
        self.ctx.tree.symbol_mut(scope).map(|s| &mut s.kind)
    }
}
