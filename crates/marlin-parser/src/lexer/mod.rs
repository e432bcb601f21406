//! Lexical analysis: token kinds, the ordered rule table, the tokenizer and
//! the cursor the parser reads tokens through.

mod cursor;
mod rules;
mod token;
mod tokenizer;

pub use cursor::TokenCursor;
pub use rules::{Rule, RuleAction, match_rule, rules};
pub use token::{Token, TokenKind};
pub use tokenizer::{TokenStream, Tokenizer, tokenize};
