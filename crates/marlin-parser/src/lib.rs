//! Marlin parser crate.
//!
//! This crate provides the lexer and parser for Marlin source code:
//! - Lexical analysis driven by an ordered rule table
//! - A token cursor with speculative lookahead
//! - Abstract Syntax Tree (AST) definitions
//! - A recursive-descent parser that reports problems as diagnostics
//!
//! # Example
//!
//! ```
//! use marlin_parser::{FileId, Parser, tokenize};
//!
//! let stream = tokenize("module app; public class Main { }", "main.mn");
//! assert!(!stream.contains_invalid());
//!
//! let parsed = Parser::new(stream.tokens, FileId(0)).parse();
//! assert_eq!(parsed.unit.map(|u| u.types.len()), Some(1));
//! ```

// Lexer module
pub mod lexer;

// AST module
pub mod ast;

// Re-export commonly used types at crate root
pub use ast::{CompilationUnit, FileId, NodeId, ParsedUnit, Parser, parse};
pub use lexer::{Token, TokenCursor, TokenKind, TokenStream, tokenize};
