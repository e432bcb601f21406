//! Type name parsing.

use super::error::ParseResult;
use super::parser::Parser;
use super::types::TypeReference;
use crate::lexer::TokenKind;

impl Parser {
    /// Parse a type name.
    ///
    /// Grammar: `'void' | NAME ('<' TYPE (',' TYPE)* '>')? '?'?`
    pub fn parse_type_name(&mut self) -> ParseResult<TypeReference> {
        if let Some(void) = self.eat(TokenKind::Void) {
            return Ok(TypeReference::void(self.next_id(), Some(void.location)));
        }

        let location = self.peek_location()?;
        let full_name = self.parse_module_name()?;

        let mut generic_args = Vec::new();
        if self.eat(TokenKind::LeftAngle).is_some() {
            loop {
                generic_args.push(self.parse_type_name()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightAngle)?;
        }

        let nullable = self.eat(TokenKind::Question).is_some();

        Ok(TypeReference::named(
            self.next_id(),
            Some(location),
            full_name,
            nullable,
            generic_args,
        ))
    }

    /// Parse a `::`-separated name such as `app::core` or `std::Int32`.
    pub(super) fn parse_module_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect(TokenKind::Identifier)?.text;
        while self.eat(TokenKind::DoubleColon).is_some() {
            name.push_str("::");
            name.push_str(&self.expect(TokenKind::Identifier)?.text);
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::tokenize;

    fn type_name(source: &str) -> Result<TypeReference, ParseError> {
        let tokens = tokenize(source, "test.mn").tokens;
        Parser::new(tokens, FileId(0)).parse_type_name()
    }

    #[test]
    fn simple_and_qualified() {
        assert_eq!(type_name("Foo").unwrap().full_name(), "Foo");
        assert_eq!(type_name("a::b::Foo").unwrap().full_name(), "a::b::Foo");
        assert!(type_name("void").unwrap().is_void());
    }

    #[test]
    fn generic_and_nullable() {
        let t = type_name("std::Map<K, std::List<V>?>?").unwrap();
        assert!(t.is_nullable());
        assert_eq!(t.generic_args().len(), 2);
        assert!(t.generic_args()[1].is_nullable());
        assert_eq!(t.to_string(), "std::Map<K, std::List<V>?>?");
    }

    #[test]
    fn dangling_separator_is_an_error() {
        assert!(matches!(type_name("a::;"), Err(ParseError::Syntax { .. })));
        assert!(matches!(type_name("a::"), Err(ParseError::Cancelled { .. })));
    }

    #[test]
    fn unclosed_generic_list() {
        assert!(type_name("List<T;").is_err());
    }
}
