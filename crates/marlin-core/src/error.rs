//! Internal error types.
//!
//! These are not user diagnostics. A [`ScopeError`] or [`ResolveError`] means
//! the resolver broke one of its own invariants; malformed source text is
//! always reported through [`Diagnostics`](crate::Diagnostics) instead.

use thiserror::Error;

/// Structural violations of the scope tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// A named symbol was inserted next to a sibling with the same name.
    #[error("symbol '{name}' already exists in this scope")]
    AlreadyExists { name: String },

    /// A lookup that had to succeed found nothing.
    #[error("symbol not found: {what}")]
    NotFound { what: String },

    /// A lookup found a symbol of a different kind than requested.
    #[error("symbol '{name}' is a {found}, expected a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A scope id that does not belong to the tree.
    #[error("scope {index} does not exist")]
    InvalidScope { index: usize },

    /// A scope cannot be re-parented under itself or one of its descendants.
    #[error("scope {index} cannot become its own ancestor")]
    Cycle { index: usize },
}

/// Failures of the semantic resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// A side-table entry read before any pass wrote it.
    #[error("missing binding for node {node}: {what}")]
    MissingBinding { node: String, what: &'static str },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ResolveError {
    pub fn internal(message: impl Into<String>) -> Self {
        ResolveError::Internal {
            message: message.into(),
        }
    }
}
