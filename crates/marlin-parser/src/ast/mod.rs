//! Abstract Syntax Tree (AST) for Marlin.
//!
//! This module provides:
//! - AST node definitions (owned, with a [`NodeId`] on every node)
//! - The recursive-descent [`Parser`] with error recovery
//!
//! # Example
//!
//! ```
//! use marlin_parser::ast::{FileId, Parser, TypeDefinition};
//!
//! let source = r#"
//!     module app;
//!
//!     public class Main {
//!         public static void Run() { }
//!     }
//! "#;
//!
//! let parsed = Parser::parse_source(source, "main.mn", FileId(0));
//! let unit = parsed.unit.expect("a module directive");
//! assert_eq!(unit.module_name, "app");
//! assert!(matches!(unit.types[0], TypeDefinition::Class(_)));
//! assert!(parsed.diagnostics.is_empty());
//! ```

pub mod node;
pub mod ops;

mod error;
mod parser;
mod type_parser;
pub mod types;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub mod decl;
mod decl_parser;

pub use decl::*;
pub use error::{ParseError, ParseResult};
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use parser::{DEFAULT_MAX_PARSE_ERRORS, ParsedUnit, Parser, parse};
pub use stmt::*;
pub use types::*;
