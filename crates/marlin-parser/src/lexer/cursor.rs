//! Random-access cursor over a tokenized file.
//!
//! The parser consumes tokens through a [`TokenCursor`]. The cursor starts
//! *before* the first token: [`TokenCursor::current`] is `None` until the
//! first [`TokenCursor::advance`]. Speculative lookahead is done on a
//! [`TokenCursor::fork`], which shares the token buffer and leaves the
//! original position untouched.

use super::token::{Token, TokenKind};
use std::sync::Arc;

/// A position inside a token buffer.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Arc<[Token]>,
    /// Number of tokens consumed so far.
    position: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
            position: 0,
        }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<&Token> {
        if self.position >= self.tokens.len() {
            return None;
        }
        self.position += 1;
        self.tokens.get(self.position - 1)
    }

    /// The next token, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    /// The token `offset` positions ahead; `1` is the next token.
    #[inline]
    pub fn peek_nth(&self, offset: usize) -> Option<&Token> {
        if offset == 0 {
            return self.current();
        }
        self.tokens.get(self.position + offset - 1)
    }

    /// Check that the next token has `kind` without consuming it.
    ///
    /// On mismatch the error carries the token that was found instead, or
    /// `None` at end of input.
    pub fn try_expect(&self, kind: TokenKind) -> Result<&Token, Option<&Token>> {
        match self.peek() {
            Some(token) if token.kind == kind => Ok(token),
            other => Err(other),
        }
    }

    /// Peek past a run of `skip` tokens, then `then_skip` more tokens.
    ///
    /// `peek_after_skipping(TokenKind::Modifier, 0)` is the token following
    /// the modifiers. `None` when that runs past the end of input.
    pub fn peek_after_skipping(&self, skip: TokenKind, then_skip: usize) -> Option<&Token> {
        let rest = &self.tokens[self.position.min(self.tokens.len())..];
        let run = rest.iter().take_while(|t| t.kind == skip).count();
        rest.get(run + then_skip)
    }

    #[inline]
    pub fn is_next(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Consume the next token, discarding it.
    #[inline]
    pub fn skip(&mut self) {
        self.advance();
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    /// The most recently consumed token.
    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.position.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// A copy of this cursor at the same position.
    #[inline]
    pub fn fork(&self) -> TokenCursor {
        self.clone()
    }

    /// Number of tokens consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The last token of the buffer, used to place end-of-file diagnostics.
    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }
}
