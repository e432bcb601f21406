//! Parser state, token helpers, error recovery and the compilation unit.
//!
//! The parser is split across several files, each adding an `impl Parser`
//! block for one part of the grammar:
//!
//! - `parser.rs`: state, helpers, recovery, module header
//! - `decl_parser.rs`: type definitions and members
//! - `stmt_parser.rs`: blocks and statements
//! - `expr_parser.rs`: expressions (precedence climbing)
//! - `type_parser.rs`: type names

use super::decl::{CompilationUnit, Dependency, TypeDefinition};
use super::error::{ParseError, ParseResult};
use super::node::{FileId, NodeId, NodeIdGenerator};
use crate::lexer::{Token, TokenCursor, TokenKind, tokenize};
use marlin_core::{Accessibility, Diagnostics, MessageId, Modifiers, SourceLocation};
use std::sync::Arc;

/// Severe diagnostics a file may produce before parsing is cancelled.
pub const DEFAULT_MAX_PARSE_ERRORS: usize = 8;

/// Modifier keywords in the order they are checked against a filter.
const MODIFIER_KEYWORDS: [Modifiers; 5] = [
    Modifiers::PUBLIC,
    Modifiers::PRIVATE,
    Modifiers::PROTECTED,
    Modifiers::INTERNAL,
    Modifiers::STATIC,
];

/// The result of parsing one file.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    /// `None` when the file has no tokens or no valid module declaration.
    pub unit: Option<CompilationUnit>,
    pub diagnostics: Diagnostics,
}

/// Recursive-descent parser for one tokenized file.
///
/// The parser holds no global state: parsing the same tokens twice with the
/// same [`FileId`] produces structurally equal trees with equal node ids.
pub struct Parser {
    pub(super) tokens: TokenCursor,
    ids: NodeIdGenerator,
    path: Arc<str>,
    /// Module named by the header, stamped onto every type definition.
    pub(super) module_name: String,
    pub(super) diagnostics: Diagnostics,
    max_errors: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, file: FileId) -> Self {
        let path = tokens
            .first()
            .map(|t| Arc::from(t.location.file()))
            .unwrap_or_else(|| Arc::from("<empty>"));
        Self {
            tokens: TokenCursor::new(tokens),
            ids: NodeIdGenerator::new(file),
            path,
            module_name: String::new(),
            diagnostics: Diagnostics::new(),
            max_errors: DEFAULT_MAX_PARSE_ERRORS,
        }
    }

    /// Cancel parsing once more than `max_errors` severe diagnostics exist.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Parse the whole file.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(mut self) -> ParsedUnit {
        let unit = self.parse_compilation_unit();
        ParsedUnit {
            unit,
            diagnostics: self.diagnostics,
        }
    }

    /// Tokenize and parse `source` in one step.
    ///
    /// Tokenizer diagnostics come first. A file containing invalid characters
    /// is not parsed at all.
    pub fn parse_source(source: &str, path: impl Into<Arc<str>>, file: FileId) -> ParsedUnit {
        let stream = tokenize(source, path);
        if stream.contains_invalid() {
            return ParsedUnit {
                unit: None,
                diagnostics: stream.diagnostics,
            };
        }
        let mut diagnostics = stream.diagnostics;
        let parsed = Parser::new(stream.tokens, file).parse();
        diagnostics.extend(parsed.diagnostics);
        ParsedUnit {
            unit: parsed.unit,
            diagnostics,
        }
    }

    fn parse_compilation_unit(&mut self) -> Option<CompilationUnit> {
        let location = self.tokens.peek()?.location.clone();
        let id = self.next_id();
        let mut dependencies = Vec::new();

        match self.parse_header(&mut dependencies) {
            Ok(Some(name)) => self.module_name = name,
            Ok(None) => return None,
            Err(error) => {
                self.report_unrecovered(error);
                return None;
            }
        }

        let mut types = Vec::new();
        if let Err(error) = self.parse_type_definitions(&mut types) {
            self.report_unrecovered(error);
        }

        Some(CompilationUnit {
            id,
            location: Some(location),
            module_name: self.module_name.clone(),
            dependencies,
            types,
        })
    }

    /// `using` directives, the `module` directive, then more `using`s.
    ///
    /// Returns `Ok(None)` after reporting a missing module directive.
    fn parse_header(&mut self, dependencies: &mut Vec<Dependency>) -> ParseResult<Option<String>> {
        self.parse_using_directives(dependencies)?;

        let found = match self.tokens.try_expect(TokenKind::Module) {
            Ok(_) => None,
            Err(found) => Some(found.cloned()),
        };
        if let Some(found) = found {
            match found {
                Some(token) => self.diagnostics.error(
                    MessageId::UnexpectedToken,
                    format!("Expected module name statement, got {}", token.kind),
                    Some(token.location),
                ),
                None => self.diagnostics.error(
                    MessageId::UnexpectedToken,
                    "Expected module name statement, got end of file",
                    None,
                ),
            }
            return Ok(None);
        }

        self.tokens.skip();
        let name = self.parse_module_name()?;
        self.expect(TokenKind::Semicolon)?;

        self.parse_using_directives(dependencies)?;
        Ok(Some(name))
    }

    fn parse_using_directives(&mut self, dependencies: &mut Vec<Dependency>) -> ParseResult<()> {
        while self.check(TokenKind::Using) {
            match self.parse_using_directive() {
                Ok(dependency) => dependencies.push(dependency),
                Err(error) => self.recover(error, true)?,
            }
        }
        Ok(())
    }

    fn parse_using_directive(&mut self) -> ParseResult<Dependency> {
        self.expect(TokenKind::Using)?;
        let location = self.peek_location()?;
        let name = self.parse_module_name()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Dependency {
            name,
            location: Some(location),
        })
    }

    fn parse_type_definitions(&mut self, types: &mut Vec<TypeDefinition>) -> ParseResult<()> {
        while self.tokens.has_next() {
            match self.parse_type_definition() {
                Ok(definition) => types.push(definition),
                Err(error) => self.recover(error, true)?,
            }
        }
        Ok(())
    }

    /// Record an error no recovery point caught.
    fn report_unrecovered(&mut self, error: ParseError) {
        match error {
            ParseError::Cancelled { reason } => self.diagnostics.info(
                MessageId::ParsingCancelled,
                format!("Parsing cancelled for file {}: {}", self.path, reason),
                None,
            ),
            ParseError::Syntax {
                id,
                message,
                location,
            } => self.diagnostics.error(id, message, location),
        }
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Log a syntax error and skip to the next `;` or `}`.
    ///
    /// A `;` is always consumed; a `}` only when `consume_brace` is set, so
    /// recovery inside a block or type body stops at its closing brace.
    /// Cancellation passes through untouched, and too many severe errors
    /// turn into a cancellation.
    pub(super) fn recover(&mut self, error: ParseError, consume_brace: bool) -> ParseResult<()> {
        let ParseError::Syntax {
            id,
            message,
            location,
        } = error
        else {
            return Err(error);
        };

        self.diagnostics.error(id, message, location);
        if self.diagnostics.severe_count() > self.max_errors {
            return Err(ParseError::Cancelled {
                reason: "Too many errors found in file during parsing".to_string(),
            });
        }

        while let Some(token) = self.tokens.peek() {
            match token.kind {
                TokenKind::Semicolon => {
                    self.tokens.skip();
                    break;
                }
                TokenKind::RightBrace => {
                    if consume_brace {
                        self.tokens.skip();
                    }
                    break;
                }
                _ => self.tokens.skip(),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    #[inline]
    pub(super) fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    #[inline]
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.tokens.is_next(kind)
    }

    /// Consume the next token if it has `kind`.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.tokens.advance().cloned()
        } else {
            None
        }
    }

    /// Consume the next token, which must have `kind`.
    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        match self.tokens.try_expect(kind) {
            Ok(_) => self.advance(),
            Err(Some(found)) => Err(ParseError::unexpected(
                format!("Expected {}, got {}", kind, found.kind),
                Some(found.location.clone()),
            )),
            Err(None) => Err(ParseError::premature_eof()),
        }
    }

    /// Consume any token; end of file cancels parsing.
    pub(super) fn advance(&mut self) -> ParseResult<Token> {
        self.tokens
            .advance()
            .cloned()
            .ok_or_else(ParseError::premature_eof)
    }

    pub(super) fn peek_token(&self) -> ParseResult<&Token> {
        self.tokens.peek().ok_or_else(ParseError::premature_eof)
    }

    pub(super) fn peek_location(&self) -> ParseResult<SourceLocation> {
        self.peek_token().map(|t| t.location.clone())
    }

    /// A throwaway parser at the same position, for speculative lookahead.
    ///
    /// Nothing the fork records is ever merged back.
    pub(super) fn speculate(&self) -> Parser {
        Parser {
            tokens: self.tokens.fork(),
            ids: self.ids.clone(),
            path: Arc::clone(&self.path),
            module_name: self.module_name.clone(),
            diagnostics: Diagnostics::new(),
            max_errors: self.max_errors,
        }
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    /// Collect leading modifier keywords, reporting repetitions.
    pub(super) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        while let Some(token) = self.eat(TokenKind::Modifier) {
            let Some(flag) = Modifiers::from_keyword(&token.text) else {
                continue;
            };
            if modifiers.contains(flag) {
                self.diagnostics.error(
                    MessageId::RepeatedModifier,
                    format!("Repeated modifier {}", token.text),
                    Some(token.location),
                );
            }
            modifiers.insert(flag);
        }
        modifiers
    }

    /// Report every modifier outside `allowed`.
    pub(super) fn filter_modifiers(
        &mut self,
        modifiers: Modifiers,
        allowed: Modifiers,
        location: &SourceLocation,
    ) {
        for flag in MODIFIER_KEYWORDS {
            if modifiers.contains(flag) && !allowed.contains(flag) {
                self.diagnostics.error(
                    MessageId::InapplicableModifier,
                    format!("Invalid modifier {}", flag.keyword()),
                    Some(location.clone()),
                );
            }
        }
    }

    /// Visibility chosen by `modifiers`, warning with `style` when none is written.
    pub(super) fn visibility(
        &mut self,
        modifiers: Modifiers,
        style: MessageId,
        location: &SourceLocation,
    ) -> Accessibility {
        if !modifiers.has_visibility() {
            self.diagnostics.warn(
                style,
                "Always specify visibility. Using internal.",
                Some(location.clone()),
            );
        }
        modifiers.accessibility()
    }
}

/// Parse a token stream with the default error limit.
pub fn parse(tokens: Vec<Token>, file: FileId) -> ParsedUnit {
    Parser::new(tokens, file).parse()
}
