//! Statement parsing.

use super::error::{ParseError, ParseResult};
use super::parser::Parser;
use super::stmt::*;
use crate::lexer::TokenKind;

impl Parser {
    /// Parse a `{ ... }` block, recovering from errors statement by statement.
    pub fn parse_block(&mut self) -> ParseResult<Block> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let id = self.next_id();
        let mut statements = Vec::new();

        loop {
            if self.peek_token()?.kind == TokenKind::RightBrace {
                break;
            }
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => self.recover(error, false)?,
            }
        }
        self.expect(TokenKind::RightBrace)?;

        Ok(Block {
            id,
            location: Some(open.location),
            statements,
        })
    }

    /// Parse a statement.
    ///
    /// Dispatches on the next token; a local variable declaration is told
    /// apart from an expression statement by a speculative parse of
    /// `'mut'? TYPE IDENT (';' | '=')`.
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        let kind = self.peek_token()?.kind;
        match kind {
            TokenKind::Semicolon => {
                self.tokens.skip();
                Ok(Statement::Empty)
            }
            TokenKind::LeftBrace => self.parse_block().map(Statement::Block),
            TokenKind::Return => self.parse_return().map(Statement::Return),
            _ if self.is_local_variable() => self.parse_local_variable().map(Statement::LocalVariable),
            _ => self.parse_expression_statement(),
        }
    }

    fn is_local_variable(&self) -> bool {
        let mut probe = self.speculate();
        probe.eat(TokenKind::Mutable);
        probe.parse_type_name().is_ok()
            && probe.expect(TokenKind::Identifier).is_ok()
            && (probe.check(TokenKind::Semicolon) || probe.check(TokenKind::Assign))
    }

    /// Grammar: `'mut'? TYPE IDENT ('=' EXPR)? ';'`
    fn parse_local_variable(&mut self) -> ParseResult<LocalVariable> {
        let mutable = self.eat(TokenKind::Mutable).is_some();
        let type_ref = self.parse_type_name()?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let id = self.next_id();

        let initializer = if self.eat(TokenKind::Assign).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(LocalVariable {
            id,
            location: Some(name_token.location),
            type_ref,
            name: name_token.text,
            mutable,
            initializer,
        })
    }

    /// Grammar: `'return' EXPR? ';'`
    fn parse_return(&mut self) -> ParseResult<ReturnStatement> {
        let keyword = self.expect(TokenKind::Return)?;
        let id = self.next_id();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(ReturnStatement {
            id,
            location: Some(keyword.location),
            value,
        })
    }

    /// Only method calls and assignments may stand alone.
    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression()?;
        if !expr.is_statement_expression() {
            return Err(ParseError::unexpected(
                format!("Expected statement, got {} expression", expr.kind_name()),
                expr.location.clone(),
            ));
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Expression(expr))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use marlin_core::MessageId;

    fn body(statements: &str) -> (Vec<Statement>, ParsedUnit) {
        let source = format!(
            "module m; public class A {{ public void F() {{ {} }} }}",
            statements
        );
        let parsed = Parser::parse_source(&source, "test.mn", FileId(0));
        let unit = parsed.unit.clone().expect("unit");
        let Some(Member::Method(method)) = unit.types[0].members().first().cloned() else {
            panic!("expected method: {}", parsed.diagnostics);
        };
        (method.body.statements, parsed)
    }

    #[test]
    fn local_variables() {
        let (statements, parsed) = body("std::Int32 a; mut std::Int32 b = 3; std::List<T>? c = null;");
        assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
        assert_eq!(statements.len(), 3);

        let Statement::LocalVariable(a) = &statements[0] else {
            panic!("expected local");
        };
        assert_eq!(a.name, "a");
        assert!(!a.mutable);
        assert!(a.initializer.is_none());

        let Statement::LocalVariable(b) = &statements[1] else {
            panic!("expected local");
        };
        assert!(b.mutable);
        assert!(b.initializer.is_some());

        let Statement::LocalVariable(c) = &statements[2] else {
            panic!("expected local");
        };
        assert_eq!(c.type_ref.to_string(), "std::List<T>?");
        assert!(matches!(
            c.initializer.as_ref().map(|e| &e.kind),
            Some(ExpressionKind::Null)
        ));
    }

    #[test]
    fn assignment_and_call_statements() {
        let (statements, parsed) = body("x = 5; Print(x); std::Console.WriteLine(1);");
        assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
        assert_eq!(statements.len(), 3);
        assert!(matches!(
            &statements[0],
            Statement::Expression(Expression { kind: ExpressionKind::VariableAssignment { .. }, .. })
        ));
        assert!(matches!(
            &statements[1],
            Statement::Expression(Expression { kind: ExpressionKind::MethodCall { .. }, .. })
        ));
        let Statement::Expression(call) = &statements[2] else {
            panic!("expected expression");
        };
        assert!(matches!(
            call.target().map(|t| &t.kind),
            Some(ExpressionKind::TypeReference(_))
        ));
    }

    #[test]
    fn nested_blocks_and_empty_statements() {
        let (statements, parsed) = body("; { std::Int32 a; ; } ;");
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0], Statement::Empty);
        let Statement::Block(block) = &statements[1] else {
            panic!("expected block");
        };
        assert_eq!(block.statements.len(), 2);
        assert!(matches!(block.statements[0], Statement::LocalVariable(_)));
    }

    #[test]
    fn return_statements() {
        let (statements, _) = body("return; return 1 + 2;");
        assert!(matches!(&statements[0], Statement::Return(r) if r.value.is_none()));
        assert!(matches!(
            &statements[1],
            Statement::Return(ReturnStatement { value: Some(Expression { kind: ExpressionKind::BinaryOperator { .. }, .. }), .. })
        ));
    }

    #[test]
    fn bare_member_access_is_not_a_statement() {
        let (statements, parsed) = body("x; Run();");
        assert_eq!(parsed.diagnostics.count_of(MessageId::UnexpectedToken), 1);
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn unspaced_minus_is_a_signed_literal() {
        let source = "module m; public class A { public void F() { x = y-1; } }";
        let parsed = Parser::parse_source(source, "test.mn", FileId(0));
        assert!(parsed.diagnostics.contains(MessageId::UnexpectedToken), "{}", parsed.diagnostics);

        let (statements, parsed) = body("x = y - 1;");
        assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn missing_semicolon_recovers_at_closing_brace() {
        let source = "module m; public class A { public void F() { Run() } public void G() { } }";
        let parsed = Parser::parse_source(source, "test.mn", FileId(0));
        assert_eq!(parsed.diagnostics.count_of(MessageId::UnexpectedToken), 1);
        let unit = parsed.unit.unwrap();
        assert_eq!(unit.types[0].members().len(), 2);
    }
}
