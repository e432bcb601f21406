//! Marlin frontend.
//!
//! Turns Marlin source files into a resolved program: every file is
//! tokenized and parsed in parallel, units that share a module name are
//! merged, and the two resolver passes run over the merged forest.
//!
//! - [`Frontend`]: the driver
//! - [`FrontendConfig`]: standard library location, file extension, limits
//! - [`Analysis`]: merged units, scope tree, bindings and diagnostics
//! - [`FrontendError`]: failures that prevent analysis
//!
//! The building blocks live in their own crates and are re-exported here:
//! [`marlin_core`], [`marlin_parser`], [`marlin_registry`] and
//! [`marlin_compiler`].

pub mod config;
pub mod error;
pub mod frontend;

pub use config::{DEFAULT_EXTENSION, FrontendConfig, STDLIB_DIR_NAME, STDLIB_ENV};
pub use error::{FrontendError, FrontendResult};
pub use frontend::{Analysis, Frontend, SourceFile, merge_by_module};

pub use marlin_compiler;
pub use marlin_core;
pub use marlin_parser;
pub use marlin_registry;
