//! Shared building blocks for the Marlin frontend.
//!
//! - [`SourceLocation`] / [`LineTracker`]: where things are in a file
//! - [`Diagnostic`], [`Diagnostics`], [`MessageId`], [`ResultCode`]: what went wrong
//! - [`Modifiers`], [`Accessibility`], [`SetAccessibility`]: declaration modifiers
//! - [`ScopeError`], [`ResolveError`]: internal invariant failures

mod diagnostic;
mod error;
mod location;
mod modifiers;

pub use diagnostic::{Diagnostic, Diagnostics, Fatality, MessageId, ResultCode};
pub use error::{ResolveError, ScopeError};
pub use location::{LineTracker, SourceLocation};
pub use modifiers::{Accessibility, Modifiers, SetAccessibility};
