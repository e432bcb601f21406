//! Statement resolution inside method, constructor and initializer bodies.

use marlin_core::{MessageId, ResolveError, SourceLocation};
use marlin_parser::ast::{Block, Expression, LocalVariable, ReturnStatement, Statement, TypeReference};
use marlin_registry::{ScopeId, Symbol, TypeUsage, VariableSymbol};

use crate::context::{ResolverContext, Site};
use crate::type_resolver::{Assignability, TypeResolver, check_assignable};

/// Where a value is being stored, for choosing the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ValueContext {
    Assignment,
    Return,
}

/// Resolves one body.
///
/// Locals are registered in the scope of the member that owns the body, in
/// statement order, so a name used before its declaration is not found.
pub(super) struct BodyResolver<'a> {
    pub(super) ctx: &'a mut ResolverContext,
    pub(super) site: Site,
    /// Type whose members unqualified calls and names fall back to.
    pub(super) enclosing_type: ScopeId,
    /// `None` outside methods and constructors.
    return_type: Option<TypeUsage>,
}

impl<'a> BodyResolver<'a> {
    pub(super) fn new(
        ctx: &'a mut ResolverContext,
        site: Site,
        enclosing_type: ScopeId,
        return_type: Option<TypeUsage>,
    ) -> Self {
        Self {
            ctx,
            site,
            enclosing_type,
            return_type,
        }
    }

    pub(super) fn resolve_block(&mut self, block: &Block) -> Result<(), ResolveError> {
        for statement in &block.statements {
            self.resolve_statement(statement)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &Statement) -> Result<(), ResolveError> {
        match statement {
            Statement::LocalVariable(local) => self.resolve_local(local),
            Statement::Return(ret) => self.resolve_return(ret),
            Statement::Expression(expr) => self.resolve_expression(expr).map(|_| ()),
            Statement::Block(block) => self.resolve_block(block),
            Statement::Empty => Ok(()),
        }
    }

    fn resolve_local(&mut self, local: &LocalVariable) -> Result<(), ResolveError> {
        let declared = self.resolve_type(&local.type_ref);
        // The initializer cannot see the variable it initializes.
        if let Some(initializer) = &local.initializer {
            self.check_assignment(initializer, &declared)?;
        }

        let symbol = Symbol::variable(
            &local.name,
            VariableSymbol {
                ty: Some(declared.clone()),
                is_initialized: local.initializer.is_some(),
                mutable: local.mutable,
            },
        )
        .with_location(local.location.clone());

        let scope = if self.ctx.tree.find_child(self.site.scope, &local.name).is_some() {
            self.ctx.error(
                MessageId::SymbolAlreadyDefined,
                format!("Variable '{}' is already defined", local.name),
                local.location.as_ref(),
            );
            self.ctx.tree.new_detached(Some(symbol))
        } else {
            self.ctx.tree.add_symbol(self.site.scope, symbol)?
        };
        self.ctx.bindings.bind_symbol(local.id, scope);
        self.ctx.bindings.bind_type(local.id, declared);
        Ok(())
    }

    fn resolve_return(&mut self, ret: &ReturnStatement) -> Result<(), ResolveError> {
        let Some(expected) = self.return_type.clone() else {
            if let Some(value) = &ret.value {
                self.resolve_expression(value)?;
            }
            return Ok(());
        };
        let location = ret.location.as_ref();

        match &ret.value {
            Some(value) if expected.is_void() => {
                let actual = self.resolve_expression(value)?;
                self.ctx.bindings.bind_type(ret.id, actual);
                self.ctx.error(
                    MessageId::ReturningValueFromVoidMethod,
                    "Cannot return a value from a void method",
                    location,
                );
            }
            Some(value) => {
                let actual = self.resolve_expression(value)?;
                self.report_mismatch(&expected, &actual, value.location.as_ref(), ValueContext::Return);
                self.ctx.bindings.bind_type(ret.id, actual);
            }
            None if !expected.is_void() => {
                let message = format!(
                    "Method must return a value of type '{}'",
                    self.ctx.describe(&expected)
                );
                self.ctx
                    .error(MessageId::ReturningVoidFromNonVoidMethod, message, location);
                self.ctx.bindings.bind_type(ret.id, TypeUsage::void());
            }
            None => self.ctx.bindings.bind_type(ret.id, TypeUsage::void()),
        }
        Ok(())
    }

    /// Resolve `value` and check it can be stored where `target` is expected.
    pub(super) fn check_assignment(
        &mut self,
        value: &Expression,
        target: &TypeUsage,
    ) -> Result<TypeUsage, ResolveError> {
        let actual = self.resolve_expression(value)?;
        self.report_mismatch(target, &actual, value.location.as_ref(), ValueContext::Assignment);
        Ok(actual)
    }

    /// Report a value that does not fit its target, if it doesn't.
    pub(super) fn report_mismatch(
        &mut self,
        target: &TypeUsage,
        actual: &TypeUsage,
        location: Option<&SourceLocation>,
        context: ValueContext,
    ) {
        let outcome = check_assignable(&self.ctx.tree, target, actual);
        if outcome == Assignability::Assignable {
            return;
        }
        let target_name = self.ctx.describe(target);
        let actual_name = self.ctx.describe(actual);
        match (context, outcome) {
            (ValueContext::Return, _) => self.ctx.error(
                MessageId::ReturningInvalidType,
                format!("Cannot return '{actual_name}' from a method returning '{target_name}'"),
                location,
            ),
            (ValueContext::Assignment, Assignability::NullNotAllowed) => self.ctx.error(
                MessageId::CannotAssignNullToType,
                format!("Cannot assign null to non-nullable type '{target_name}'"),
                location,
            ),
            (ValueContext::Assignment, _) => self.ctx.error(
                MessageId::AssignedValueDoesNotMatchType,
                format!("Cannot assign a value of type '{actual_name}' to '{target_name}'"),
                location,
            ),
        }
    }

    pub(super) fn resolve_type(&mut self, type_ref: &TypeReference) -> TypeUsage {
        TypeResolver::new(self.ctx, &self.site).resolve(type_ref)
    }
}
