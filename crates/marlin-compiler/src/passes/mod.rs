//! Resolver passes.
//!
//! - [`declaration`]: Pass 1 - register every declaration without resolving it
//! - [`resolution`]: Pass 2 - resolve signatures, then bodies

pub mod declaration;
pub mod resolution;

pub use declaration::{DeclarationOutput, DeclarationPass};
pub use resolution::{ResolutionOutput, ResolutionPass};
