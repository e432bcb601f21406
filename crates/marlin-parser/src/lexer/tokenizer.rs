//! Tokenizer for Marlin source text.
//!
//! Drives the ordered rule table in [`rules`](super::rules) over the input.
//! Unmatched characters become [`TokenKind::Invalid`] tokens plus an
//! `InvalidCharacter` diagnostic; tokenization never stops early.

use super::cursor::TokenCursor;
use super::rules::{RuleAction, match_rule};
use super::token::{Token, TokenKind};
use marlin_core::{Diagnostics, LineTracker, MessageId, SourceLocation};
use std::sync::Arc;

/// Streaming tokenizer over one source file.
pub struct Tokenizer<'src> {
    source: &'src str,
    file: Arc<str>,
    /// Byte offset of the unconsumed input.
    offset: usize,
    lines: LineTracker<'src>,
    diagnostics: Diagnostics,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str, file: impl Into<Arc<str>>) -> Self {
        Self {
            source,
            file: file.into(),
            offset: 0,
            lines: LineTracker::new(source),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Produce the next token, skipping whitespace and comments.
    ///
    /// Returns `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            let rest = &self.source[self.offset..];
            let trimmed = rest.trim_start();
            self.offset += rest.len() - trimmed.len();

            if trimmed.is_empty() {
                return None;
            }

            let start = self.offset;
            match match_rule(trimmed) {
                Some((RuleAction::Skip, len)) => {
                    self.offset += len;
                }
                Some((RuleAction::Emit(kind), len)) => {
                    self.offset += len;
                    let matched = &trimmed[..len];
                    let text = if kind == TokenKind::String {
                        &matched[1..matched.len() - 1]
                    } else {
                        matched
                    };
                    return Some(Token::new(kind, text, self.location_at(start)));
                }
                None => {
                    let ch = trimmed.chars().next()?;
                    self.offset += ch.len_utf8();
                    let location = self.location_at(start);
                    self.diagnostics.error(
                        MessageId::InvalidCharacter,
                        format!("Invalid character: {}", ch),
                        Some(location.clone()),
                    );
                    return Some(Token::new(TokenKind::Invalid, ch.to_string(), location));
                }
            }
        }
    }

    /// Consume the whole input.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn tokenize(mut self) -> TokenStream {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        TokenStream {
            tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn location_at(&mut self, offset: usize) -> SourceLocation {
        let (line, column) = self.lines.position(offset);
        SourceLocation::new(Arc::clone(&self.file), line, column)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize `source`, attributing locations to `file`.
pub fn tokenize(source: &str, file: impl Into<Arc<str>>) -> TokenStream {
    Tokenizer::new(source, file).tokenize()
}

/// The output of tokenizing one file.
#[derive(Debug, Clone)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub diagnostics: Diagnostics,
}

impl TokenStream {
    /// Whether any character failed to tokenize. Such a stream must not be parsed.
    pub fn contains_invalid(&self) -> bool {
        self.tokens.iter().any(|t| t.kind == TokenKind::Invalid)
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    pub fn into_cursor(self) -> (TokenCursor, Diagnostics) {
        (TokenCursor::new(self.tokens), self.diagnostics)
    }
}
