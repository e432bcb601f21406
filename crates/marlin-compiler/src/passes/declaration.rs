//! Declaration Pass (Pass 1) - build the skeleton of every declaration.
//!
//! Walks every compilation unit and registers modules, types, generic
//! parameters, members and parameters in the scope tree. Nothing is resolved:
//! base types, member types and bodies are left for the main pass, so that
//! every type in every module is visible before any type name is looked up.
//!
//! Each unit is declared into a detached staging scope first. If its module
//! already exists (another unit with the same module name), the staged types
//! are merged into the existing module scope; otherwise the staging scope
//! becomes the module scope.
//!
//! Duplicate declarations are reported and left detached; the main pass
//! skips detached types and members.

use marlin_core::{MessageId, ResolveError};
use marlin_parser::ast::{CompilationUnit, Member, Parameter, TypeDefinition};
use marlin_registry::{
    ClassTypeSymbol, ExternMethodSymbol, MethodSymbol, PropertySymbol, ScopeId, Symbol,
    VariableSymbol,
};
use tracing::debug;

use crate::context::ResolverContext;

/// Output of the declaration pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationOutput {
    pub modules_declared: usize,
    pub types_declared: usize,
    pub members_declared: usize,
}

/// Pass 1: register all declarations without resolving them.
pub struct DeclarationPass<'a> {
    ctx: &'a mut ResolverContext,
    output: DeclarationOutput,
}

impl<'a> DeclarationPass<'a> {
    pub fn new(ctx: &'a mut ResolverContext) -> Self {
        Self {
            ctx,
            output: DeclarationOutput::default(),
        }
    }

    /// Run the pass over all units.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, units: &[CompilationUnit]) -> Result<DeclarationOutput, ResolveError> {
        for unit in units {
            self.declare_unit(unit)?;
        }
        debug!(
            modules = self.output.modules_declared,
            types = self.output.types_declared,
            members = self.output.members_declared,
            "declaration skeleton built"
        );
        Ok(self.output)
    }

    fn declare_unit(&mut self, unit: &CompilationUnit) -> Result<(), ResolveError> {
        let module_symbol = Symbol::module(&unit.module_name).with_location(unit.location.clone());
        let staging = self.ctx.tree.new_detached(Some(module_symbol));

        for definition in &unit.types {
            self.declare_type(staging, definition)?;
        }

        let root = self.ctx.tree.root();
        let module = match self.ctx.tree.find_child(root, &unit.module_name) {
            None => {
                self.ctx.tree.add_scope(root, staging)?;
                self.output.modules_declared += 1;
                staging
            }
            Some(existing) => {
                for child in self.ctx.tree.children(staging) {
                    let Some(symbol) = self.ctx.tree.symbol(child) else {
                        continue;
                    };
                    let name = symbol.name().to_string();
                    let location = symbol.location.clone();
                    if self.ctx.tree.find_child(existing, &name).is_some() {
                        self.ctx.error(
                            MessageId::SymbolAlreadyDefined,
                            format!("Type '{name}' is already defined"),
                            location.as_ref(),
                        );
                        self.ctx.tree.detach(child);
                        self.output.types_declared = self.output.types_declared.saturating_sub(1);
                    }
                }
                self.ctx.tree.take_children_from(existing, staging)?;
                existing
            }
        };
        debug!(module = %unit.module_name, types = unit.types.len(), "declared unit");
        self.ctx.bindings.bind_symbol(unit.id, module);
        Ok(())
    }

    fn declare_type(&mut self, module: ScopeId, definition: &TypeDefinition) -> Result<(), ResolveError> {
        let full_name = definition.full_name();
        let symbol = match definition {
            TypeDefinition::Class(class) => Symbol::class(
                full_name.clone(),
                ClassTypeSymbol {
                    generic_param_names: class.generic_params.clone(),
                    is_static: class.is_static,
                    base_type: None,
                },
            ),
            TypeDefinition::Struct(_) => Symbol::structure(full_name.clone()),
            TypeDefinition::ExternType(extern_type) => {
                Symbol::extern_type(full_name.clone(), extern_type.native_type_name.clone())
            }
        }
        .with_accessibility(definition.accessibility())
        .with_location(definition.location().cloned());

        // Built detached so members can be added before the name is claimed.
        let scope = self.ctx.tree.new_detached(Some(symbol));
        self.ctx.bindings.bind_symbol(definition.id(), scope);

        if let TypeDefinition::Class(class) = definition {
            for (position, name) in class.generic_params.iter().enumerate() {
                let param = Symbol::generic_param(name, scope, position).with_location(class.location.clone());
                self.register(scope, param)?;
            }
        }

        for member in definition.members() {
            self.declare_member(scope, member)?;
        }

        if self.ctx.tree.find_child(module, &full_name).is_some() {
            self.ctx.error(
                MessageId::SymbolAlreadyDefined,
                format!("Type '{full_name}' is already defined"),
                definition.location(),
            );
        } else {
            self.ctx.tree.add_scope(module, scope)?;
            self.output.types_declared += 1;
        }
        Ok(())
    }

    fn declare_member(&mut self, owner: ScopeId, member: &Member) -> Result<(), ResolveError> {
        let (symbol, params) = match member {
            Member::Property(property) => {
                let symbol = Symbol::property(
                    &property.name,
                    PropertySymbol {
                        ty: None,
                        get_accessibility: property.get_accessibility,
                        set_accessibility: property.set_accessibility,
                        is_static: property.is_static,
                    },
                )
                .with_accessibility(property.get_accessibility)
                .with_location(property.location.clone());
                (symbol, &[][..])
            }
            Member::Method(method) => {
                let symbol = Symbol::method(
                    &method.name,
                    MethodSymbol {
                        is_static: method.is_static,
                        ..Default::default()
                    },
                )
                .with_accessibility(method.accessibility)
                .with_location(method.location.clone());
                (symbol, &method.params[..])
            }
            Member::Constructor(constructor) => {
                let symbol = Symbol::constructor()
                    .with_accessibility(constructor.accessibility)
                    .with_location(constructor.location.clone());
                (symbol, &constructor.params[..])
            }
            Member::ExternMethod(mapping) => {
                let symbol = Symbol::extern_method(
                    mapping.name.clone(),
                    ExternMethodSymbol {
                        is_constructor: mapping.is_constructor(),
                        is_static: mapping.is_static,
                        ..Default::default()
                    },
                )
                .with_accessibility(mapping.accessibility)
                .with_location(mapping.location.clone());
                (symbol, &mapping.expected_params[..])
            }
        };

        let scope = self.register(owner, symbol)?;
        self.ctx.bindings.bind_symbol(member.id(), scope);
        self.declare_params(scope, params)?;
        self.output.members_declared += 1;
        Ok(())
    }

    fn declare_params(&mut self, callable: ScopeId, params: &[Parameter]) -> Result<(), ResolveError> {
        for param in params {
            let symbol = Symbol::variable(
                &param.name,
                VariableSymbol {
                    ty: None,
                    is_initialized: true,
                    mutable: false,
                },
            )
            .with_location(param.location.clone());
            let scope = self.register(callable, symbol)?;
            self.ctx.bindings.bind_symbol(param.id, scope);
            if let Some(list) = self.ctx.tree.symbol_mut(callable).and_then(|s| s.params_mut()) {
                list.push(scope);
            }
        }
        Ok(())
    }

    /// Add a symbol under `parent`, or report a duplicate and keep the
    /// symbol in a detached scope.
    fn register(&mut self, parent: ScopeId, symbol: Symbol) -> Result<ScopeId, ResolveError> {
        let duplicate = symbol
            .name
            .as_deref()
            .is_some_and(|name| self.ctx.tree.find_child(parent, name).is_some());
        if !duplicate {
            return Ok(self.ctx.tree.add_symbol(parent, symbol)?);
        }

        self.ctx.error(
            MessageId::SymbolAlreadyDefined,
            format!("Symbol '{}' is already defined", symbol.name()),
            symbol.location.as_ref(),
        );
        Ok(self.ctx.tree.new_detached(Some(symbol)))
    }
}
