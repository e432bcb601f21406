//! Expression parsing using precedence climbing.
//!
//! Binary operator precedences come from [`TokenKind::precedence`]; `**` is
//! the only right-associative operator. A `.` chain binds tighter than any
//! binary operator: `a.b(1) + c` adds `c` to the call.

use super::error::{ParseError, ParseResult};
use super::expr::{Expression, ExpressionKind};
use super::ops::BinaryOperator;
use super::parser::Parser;
use crate::lexer::{Token, TokenKind};
use marlin_core::MessageId;

impl Parser {
    /// Parse a full expression.
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary(0)
    }

    /// Parse operators binding tighter than `min_precedence`.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.parse_postfix()?;

        loop {
            let (operator, precedence, right_associative, location) = match self.tokens.peek() {
                Some(token) if token.precedence() > min_precedence => {
                    match BinaryOperator::from_token(token.kind) {
                        Some(operator) => (
                            operator,
                            token.precedence(),
                            token.is_right_associative(),
                            token.location.clone(),
                        ),
                        None => break,
                    }
                }
                _ => break,
            };
            self.tokens.skip();

            let next_min = if right_associative {
                precedence - 1
            } else {
                precedence
            };
            let right = self.parse_binary(next_min)?;

            left = Expression::new(
                self.next_id(),
                Some(location),
                ExpressionKind::BinaryOperator {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }

        Ok(left)
    }

    /// A primary followed by any number of `.` accesses.
    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_primary()?;

        while let Some(dot) = self.eat(TokenKind::Dot) {
            let right = self.parse_primary()?;
            left = right.with_target(left).map_err(|right| ParseError::Syntax {
                id: MessageId::ExpressionNotIndexable,
                message: format!("Cannot index {} expression", right.kind_name()),
                location: Some(dot.location.clone()),
            })?;
        }

        Ok(left)
    }

    /// Parse a primary expression without any operators.
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.tokens.peek().cloned() else {
            return Err(ParseError::Cancelled {
                reason: "Expected expression, got EOF".to_string(),
            });
        };
        let location = Some(token.location.clone());

        match token.kind {
            TokenKind::Null => {
                self.tokens.skip();
                Ok(Expression::new(self.next_id(), location, ExpressionKind::Null))
            }
            TokenKind::LeftParen => {
                self.tokens.skip();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::Integer => {
                self.tokens.skip();
                let value = parse_integer(&token)?;
                Ok(Expression::new(
                    self.next_id(),
                    location,
                    ExpressionKind::Integer { value },
                ))
            }
            TokenKind::New => self.parse_new(),
            TokenKind::Identifier => {
                let Some(after) = self.tokens.peek_nth(2).map(|t| t.kind) else {
                    return Err(ParseError::Cancelled {
                        reason: "Expected expression, got EOF".to_string(),
                    });
                };
                match after {
                    TokenKind::DoubleColon => {
                        let type_ref = self.parse_type_name()?;
                        Ok(Expression::new(
                            self.next_id(),
                            location,
                            ExpressionKind::TypeReference(type_ref),
                        ))
                    }
                    TokenKind::LeftParen => self.parse_method_call(),
                    TokenKind::Assign => self.parse_assignment(),
                    _ => {
                        self.tokens.skip();
                        Ok(Expression::new(
                            self.next_id(),
                            location,
                            ExpressionKind::MemberAccess {
                                target: None,
                                member_name: token.text,
                            },
                        ))
                    }
                }
            }
            other => Err(ParseError::unexpected(
                format!("Expected expression, got {}", other),
                location,
            )),
        }
    }

    /// Grammar: `IDENT ARGS '@'?`
    fn parse_method_call(&mut self) -> ParseResult<Expression> {
        let name_token = self.expect(TokenKind::Identifier)?;
        let args = self.parse_argument_list()?;
        let is_native_call = self.eat(TokenKind::At).is_some();

        Ok(Expression::new(
            self.next_id(),
            Some(name_token.location),
            ExpressionKind::MethodCall {
                target: None,
                method_name: name_token.text,
                is_native_call,
                args,
            },
        ))
    }

    /// Grammar: `IDENT '=' EXPR`
    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let name_token = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;

        Ok(Expression::new(
            self.next_id(),
            Some(name_token.location),
            ExpressionKind::VariableAssignment {
                target: None,
                name: name_token.text,
                value: Box::new(value),
            },
        ))
    }

    /// Grammar: `'new' TYPE ARGS`
    fn parse_new(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::New)?;
        let type_ref = self.parse_type_name()?;

        let next = self.peek_token()?;
        if next.kind != TokenKind::LeftParen {
            return Err(ParseError::unexpected(
                format!("Expected '(' after new, got {}", next.kind),
                Some(next.location.clone()),
            ));
        }
        let constructor_args = self.parse_argument_list()?;

        Ok(Expression::new(
            self.next_id(),
            type_ref.location.clone(),
            ExpressionKind::NewClassInitializer {
                type_ref,
                constructor_args,
            },
        ))
    }

    /// Grammar: `'(' (EXPR (',' EXPR)*)? ')'`
    pub(super) fn parse_argument_list(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();

        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_expression()?);

            let next = self.peek_token()?.clone();
            match next.kind {
                TokenKind::Comma => self.tokens.skip(),
                TokenKind::RightParen => {}
                _ => {
                    return Err(ParseError::unexpected(
                        format!("Expected ',' or ')', got {}", next.kind),
                        Some(next.location),
                    ));
                }
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(args)
    }
}

/// Decimal or `0x` hexadecimal, with an optional sign.
fn parse_integer(token: &Token) -> ParseResult<i64> {
    let text = token.text.as_str();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (digits, radix) = match unsigned.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (unsigned, 10),
    };
    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };

    i64::from_str_radix(&signed, radix).map_err(|_| {
        ParseError::unexpected(
            format!("Integer literal {} is out of range", text),
            Some(token.location.clone()),
        )
    })
}
