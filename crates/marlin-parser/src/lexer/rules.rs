//! The ordered tokenizer rule table.
//!
//! Rules are tried top to bottom against the input (after leading whitespace
//! is trimmed) and the first one that matches a non-empty prefix wins. Order
//! matters: comments come before `/`, keywords before identifiers, and every
//! compound operator before the single characters it starts with.

use super::token::TokenKind;
use regex::Regex;
use std::sync::LazyLock;

/// What a matched rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Consume the match and emit nothing (comments).
    Skip,
    /// Consume the match and emit a token of this kind.
    Emit(TokenKind),
}

/// One `(action, pattern)` entry of the table.
#[derive(Debug)]
pub struct Rule {
    pub action: RuleAction,
    pub pattern: Regex,
}

const PATTERNS: &[(RuleAction, &str)] = &[
    // Comments
    (RuleAction::Skip, r"^//[^\n]*"),
    (RuleAction::Skip, r"^(?s)/\*.*?\*/"),
    // Keywords
    (RuleAction::Emit(TokenKind::Module), r"^module\b"),
    (RuleAction::Emit(TokenKind::Class), r"^class\b"),
    (RuleAction::Emit(TokenKind::Struct), r"^struct\b"),
    (RuleAction::Emit(TokenKind::Constructor), r"^constructor\b"),
    (RuleAction::Emit(TokenKind::Using), r"^using\b"),
    (RuleAction::Emit(TokenKind::New), r"^new\b"),
    (RuleAction::Emit(TokenKind::Get), r"^get\b"),
    (RuleAction::Emit(TokenKind::Set), r"^set\b"),
    (RuleAction::Emit(TokenKind::Mutable), r"^mut\b"),
    (RuleAction::Emit(TokenKind::Void), r"^void\b"),
    (RuleAction::Emit(TokenKind::Null), r"^null\b"),
    (RuleAction::Emit(TokenKind::Extern), r"^extern\b"),
    (RuleAction::Emit(TokenKind::Return), r"^return\b"),
    (RuleAction::Emit(TokenKind::Operator), r"^operator\b"),
    (
        RuleAction::Emit(TokenKind::Modifier),
        r"^(public|private|protected|internal|static)\b",
    ),
    // Literals
    (RuleAction::Emit(TokenKind::String), r#"^"[^"\n]*""#),
    (RuleAction::Emit(TokenKind::Character), r"^'\\?.'"),
    (RuleAction::Emit(TokenKind::Boolean), r"^(true|false)\b"),
    (RuleAction::Emit(TokenKind::Decimal), r"^[-+]?[0-9]*\.[0-9]+"),
    (RuleAction::Emit(TokenKind::Integer), r"^[-+]?(0x)?[0-9]+"),
    // Compound operators
    (RuleAction::Emit(TokenKind::Arrow), r"^->"),
    (RuleAction::Emit(TokenKind::And), r"^&&"),
    (RuleAction::Emit(TokenKind::Or), r"^\|\|"),
    (RuleAction::Emit(TokenKind::DoubleColon), r"^::"),
    (RuleAction::Emit(TokenKind::Power), r"^\*\*"),
    (RuleAction::Emit(TokenKind::Equal), r"^=="),
    (RuleAction::Emit(TokenKind::NotEqual), r"^!="),
    // Single characters
    (RuleAction::Emit(TokenKind::Assign), r"^="),
    (RuleAction::Emit(TokenKind::At), r"^@"),
    (RuleAction::Emit(TokenKind::Plus), r"^\+"),
    (RuleAction::Emit(TokenKind::Minus), r"^-"),
    (RuleAction::Emit(TokenKind::Asterisk), r"^\*"),
    (RuleAction::Emit(TokenKind::Slash), r"^/"),
    (RuleAction::Emit(TokenKind::Colon), r"^:"),
    (RuleAction::Emit(TokenKind::Question), r"^\?"),
    (RuleAction::Emit(TokenKind::Ampersand), r"^&"),
    (RuleAction::Emit(TokenKind::Comma), r"^,"),
    (RuleAction::Emit(TokenKind::Dot), r"^\."),
    (RuleAction::Emit(TokenKind::Semicolon), r"^;"),
    (RuleAction::Emit(TokenKind::LeftParen), r"^\("),
    (RuleAction::Emit(TokenKind::RightParen), r"^\)"),
    (RuleAction::Emit(TokenKind::LeftBrace), r"^\{"),
    (RuleAction::Emit(TokenKind::RightBrace), r"^\}"),
    (RuleAction::Emit(TokenKind::LeftAngle), r"^<"),
    (RuleAction::Emit(TokenKind::RightAngle), r"^>"),
    // Identifiers
    (RuleAction::Emit(TokenKind::Identifier), r"^(\p{L}|_)(\p{L}|[0-9_])*"),
];

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|&(action, pattern)| Rule {
            action,
            pattern: Regex::new(pattern).expect("tokenizer patterns are valid regular expressions"),
        })
        .collect()
});

/// The rule table, compiled on first use.
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Find the first rule matching a non-empty prefix of `input`.
///
/// Returns the rule's action and the length in bytes of the match.
pub fn match_rule(input: &str) -> Option<(RuleAction, usize)> {
    rules().iter().find_map(|rule| {
        rule.pattern
            .find(input)
            .filter(|m| m.start() == 0 && m.end() > 0)
            .map(|m| (rule.action, m.end()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        assert_eq!(rules().len(), PATTERNS.len());
    }

    #[test]
    fn compound_operators_win_over_prefixes() {
        assert_eq!(match_rule("->b"), Some((RuleAction::Emit(TokenKind::Arrow), 2)));
        assert_eq!(match_rule("::x"), Some((RuleAction::Emit(TokenKind::DoubleColon), 2)));
        assert_eq!(match_rule("== 1"), Some((RuleAction::Emit(TokenKind::Equal), 2)));
        assert_eq!(match_rule("&&"), Some((RuleAction::Emit(TokenKind::And), 2)));
        assert_eq!(match_rule("**2"), Some((RuleAction::Emit(TokenKind::Power), 2)));
    }

    #[test]
    fn keywords_need_word_boundary() {
        assert_eq!(match_rule("class "), Some((RuleAction::Emit(TokenKind::Class), 5)));
        assert_eq!(
            match_rule("classy"),
            Some((RuleAction::Emit(TokenKind::Identifier), 6))
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(match_rule("// hi\nx"), Some((RuleAction::Skip, 5)));
        assert_eq!(match_rule("/* a */ /* b */"), Some((RuleAction::Skip, 7)));
    }

    #[test]
    fn unmatched_input() {
        assert_eq!(match_rule("#"), None);
        assert_eq!(match_rule("!"), None);
    }
}
