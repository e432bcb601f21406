//! Token types for the Marlin tokenizer.

use marlin_core::SourceLocation;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A token from the source code.
///
/// Two tokens are equal when their kind and text are equal; the location is
/// provenance only and takes no part in comparisons or hashing.
#[derive(Clone)]
pub struct Token {
    /// The type of token.
    pub kind: TokenKind,
    /// The matched text. String literals store their contents without quotes.
    pub text: String,
    /// Where the token starts.
    pub location: SourceLocation,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// Binding strength of this token as a binary operator (0 if it is not one).
    #[inline]
    pub fn precedence(&self) -> u8 {
        self.kind.precedence()
    }

    #[inline]
    pub fn is_right_associative(&self) -> bool {
        self.kind.is_right_associative()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.text.hash(state);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.text, self.location)
    }
}

/// All token types in Marlin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Keywords
    // =========================================
    /// `module`
    Module,
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `constructor`
    Constructor,
    /// `using`
    Using,
    /// `new`
    New,
    /// `get`
    Get,
    /// `set`
    Set,
    /// `mut`
    Mutable,
    /// `void`
    Void,
    /// `null`
    Null,
    /// `extern`
    Extern,
    /// `return`
    Return,
    /// `operator`
    Operator,
    /// `public`, `private`, `protected`, `internal`, `static`
    Modifier,

    // =========================================
    // Literals
    // =========================================
    /// `"text"`
    String,
    /// `'c'`, `'\n'`
    Character,
    /// `true`, `false`
    Boolean,
    /// `1.5`, `.5`
    Decimal,
    /// `42`, `-3`, `0x10`
    Integer,

    // =========================================
    // Operators and punctuation
    // =========================================
    /// `->`
    Arrow,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `::`
    DoubleColon,
    /// `**`
    Power,
    /// `=`
    Assign,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `@`
    At,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `&`
    Ampersand,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `<`
    LeftAngle,
    /// `>`
    RightAngle,

    // =========================================
    // Other
    // =========================================
    /// User-defined identifier
    Identifier,
    /// A character no rule accepts
    Invalid,
}

impl TokenKind {
    /// Precedence of this kind as a binary operator; 0 when it is not one.
    pub fn precedence(self) -> u8 {
        match self {
            TokenKind::Or => 1,
            TokenKind::And => 2,
            TokenKind::Equal | TokenKind::NotEqual => 3,
            TokenKind::Plus | TokenKind::Minus => 4,
            TokenKind::Asterisk | TokenKind::Slash => 5,
            TokenKind::Power => 6,
            _ => 0,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, TokenKind::Power)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Module
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Constructor
                | TokenKind::Using
                | TokenKind::New
                | TokenKind::Get
                | TokenKind::Set
                | TokenKind::Mutable
                | TokenKind::Void
                | TokenKind::Null
                | TokenKind::Extern
                | TokenKind::Return
                | TokenKind::Operator
                | TokenKind::Modifier
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Character
                | TokenKind::Boolean
                | TokenKind::Decimal
                | TokenKind::Integer
        )
    }

    /// Human-readable description used in diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Module => "'module'",
            TokenKind::Class => "'class'",
            TokenKind::Struct => "'struct'",
            TokenKind::Constructor => "'constructor'",
            TokenKind::Using => "'using'",
            TokenKind::New => "'new'",
            TokenKind::Get => "'get'",
            TokenKind::Set => "'set'",
            TokenKind::Mutable => "'mut'",
            TokenKind::Void => "'void'",
            TokenKind::Null => "'null'",
            TokenKind::Extern => "'extern'",
            TokenKind::Return => "'return'",
            TokenKind::Operator => "'operator'",
            TokenKind::Modifier => "modifier",
            TokenKind::String => "string literal",
            TokenKind::Character => "character literal",
            TokenKind::Boolean => "boolean literal",
            TokenKind::Decimal => "decimal literal",
            TokenKind::Integer => "integer literal",
            TokenKind::Arrow => "'->'",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::DoubleColon => "'::'",
            TokenKind::Power => "'**'",
            TokenKind::Assign => "'='",
            TokenKind::Equal => "'=='",
            TokenKind::NotEqual => "'!='",
            TokenKind::At => "'@'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Colon => "':'",
            TokenKind::Question => "'?'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftAngle => "'<'",
            TokenKind::RightAngle => "'>'",
            TokenKind::Identifier => "identifier",
            TokenKind::Invalid => "invalid character",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
