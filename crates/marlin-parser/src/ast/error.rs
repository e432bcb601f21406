//! Parser-internal control flow.
//!
//! A [`ParseError`] never leaves the parser: syntax errors are logged as
//! diagnostics during recovery and cancellation is reported as a
//! `ParsingCancelled` message.

use marlin_core::{MessageId, SourceLocation};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A recoverable syntax error.
    #[error("{message}")]
    Syntax {
        id: MessageId,
        message: String,
        location: Option<SourceLocation>,
    },

    /// Parsing of the whole file stops.
    #[error("{reason}")]
    Cancelled { reason: String },
}

impl ParseError {
    pub fn unexpected(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        ParseError::Syntax {
            id: MessageId::UnexpectedToken,
            message: message.into(),
            location,
        }
    }

    pub fn premature_eof() -> Self {
        ParseError::Cancelled {
            reason: "Premature EOF".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParseError::Cancelled { .. })
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
