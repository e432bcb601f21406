//! Type definition and member parsing.

use super::decl::*;
use super::error::{ParseError, ParseResult};
use super::parser::Parser;
use crate::lexer::TokenKind;
use marlin_core::{Accessibility, MessageId, Modifiers, SetAccessibility, SourceLocation};

const CLASS_MODIFIERS: Modifiers = Modifiers::PUBLIC
    .union(Modifiers::INTERNAL)
    .union(Modifiers::STATIC);
const STRUCT_MODIFIERS: Modifiers = Modifiers::PUBLIC.union(Modifiers::INTERNAL);
const EXTERN_TYPE_MODIFIERS: Modifiers = CLASS_MODIFIERS;
const MEMBER_MODIFIERS: Modifiers = Modifiers::VISIBILITY.union(Modifiers::STATIC);
const CONSTRUCTOR_MODIFIERS: Modifiers = Modifiers::VISIBILITY;

impl Parser {
    /// Parse a type definition, dispatching on the keyword after the modifiers.
    pub fn parse_type_definition(&mut self) -> ParseResult<TypeDefinition> {
        let Some(next) = self.tokens.peek_after_skipping(TokenKind::Modifier, 0).cloned() else {
            return Err(ParseError::premature_eof());
        };
        match next.kind {
            TokenKind::Class => self.parse_class().map(TypeDefinition::Class),
            TokenKind::Struct => self.parse_struct().map(TypeDefinition::Struct),
            TokenKind::Extern => self.parse_extern_type().map(TypeDefinition::ExternType),
            other => Err(ParseError::unexpected(
                format!("Expected type definition, got {} ('{}')", other, next.text),
                Some(next.location),
            )),
        }
    }

    /// Grammar: `MODIFIERS 'class' IDENT ('<' IDENT (',' IDENT)* '>')? (':' TYPE)? BODY`
    fn parse_class(&mut self) -> ParseResult<ClassDefinition> {
        let modifiers = self.parse_modifiers();
        self.expect(TokenKind::Class)?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let location = name_token.location;
        let accessibility =
            self.visibility(modifiers, MessageId::AlwaysSpecifyTypeVisibility, &location);
        self.filter_modifiers(modifiers, CLASS_MODIFIERS, &location);
        let id = self.next_id();

        let mut generic_params = Vec::new();
        if self.eat(TokenKind::LeftAngle).is_some() {
            loop {
                generic_params.push(self.expect(TokenKind::Identifier)?.text);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightAngle)?;
        }

        let base_type = if self.eat(TokenKind::Colon).is_some() {
            let base = self.parse_type_name()?;
            if base.is_nullable() {
                self.diagnostics.error(
                    MessageId::NullableTypeInheritance,
                    "Cannot inherit from nullable type. Please remove the '?' from the base class name.",
                    base.location.clone(),
                );
            }
            Some(base)
        } else {
            None
        };

        let members = self.parse_type_body()?;

        Ok(ClassDefinition {
            id,
            location: Some(location),
            name: name_token.text,
            module: self.module_name.clone(),
            accessibility,
            is_static: modifiers.is_static(),
            base_type,
            generic_params,
            members,
        })
    }

    /// Grammar: `MODIFIERS 'struct' IDENT BODY`
    fn parse_struct(&mut self) -> ParseResult<StructDefinition> {
        let modifiers = self.parse_modifiers();
        self.expect(TokenKind::Struct)?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let location = name_token.location;
        let accessibility =
            self.visibility(modifiers, MessageId::AlwaysSpecifyTypeVisibility, &location);
        self.filter_modifiers(modifiers, STRUCT_MODIFIERS, &location);
        let id = self.next_id();

        let members = self.parse_type_body()?;

        Ok(StructDefinition {
            id,
            location: Some(location),
            name: name_token.text,
            module: self.module_name.clone(),
            accessibility,
            members,
        })
    }

    /// Grammar: `MODIFIERS 'extern' IDENT ('@' IDENT)? EXTERN_BODY`
    fn parse_extern_type(&mut self) -> ParseResult<ExternTypeDefinition> {
        let modifiers = self.parse_modifiers();
        self.expect(TokenKind::Extern)?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let location = name_token.location;
        let accessibility =
            self.visibility(modifiers, MessageId::AlwaysSpecifyTypeVisibility, &location);
        self.filter_modifiers(modifiers, EXTERN_TYPE_MODIFIERS, &location);
        let id = self.next_id();

        let native_type_name = if self.eat(TokenKind::At).is_some() {
            Some(self.expect(TokenKind::Identifier)?.text)
        } else {
            None
        };

        if !modifiers.is_static() && native_type_name.is_none() {
            self.diagnostics.error(
                MessageId::ExpectedLlvmTypeName,
                format!(
                    "Expected native type name for non-static extern type {}",
                    name_token.text
                ),
                Some(location.clone()),
            );
        }

        let members = self.parse_extern_type_body()?;

        Ok(ExternTypeDefinition {
            id,
            location: Some(location),
            name: name_token.text,
            module: self.module_name.clone(),
            accessibility,
            is_static: modifiers.is_static(),
            native_type_name,
            members,
        })
    }

    fn parse_type_body(&mut self) -> ParseResult<Vec<Member>> {
        self.parse_braced_members(Parser::parse_member)
    }

    fn parse_extern_type_body(&mut self) -> ParseResult<Vec<Member>> {
        self.parse_braced_members(|parser| parser.parse_extern_method().map(Member::ExternMethod))
    }

    /// `'{' member* '}'`, recovering from errors member by member.
    fn parse_braced_members(
        &mut self,
        mut parse_one: impl FnMut(&mut Parser) -> ParseResult<Member>,
    ) -> ParseResult<Vec<Member>> {
        self.expect(TokenKind::LeftBrace)?;
        let mut members = Vec::new();
        loop {
            if self.peek_token()?.kind == TokenKind::RightBrace {
                break;
            }
            match parse_one(self) {
                Ok(member) => members.push(member),
                Err(error) => self.recover(error, false)?,
            }
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(members)
    }

    /// Parse a class or struct member.
    ///
    /// After the modifiers, `constructor` starts a constructor and
    /// `TYPE IDENT '('` a method; anything else is a property.
    pub fn parse_member(&mut self) -> ParseResult<Member> {
        let mut probe = self.speculate();
        probe.parse_modifiers();
        if probe.check(TokenKind::Constructor) {
            return self.parse_constructor().map(Member::Constructor);
        }

        let is_method = probe.parse_type_name().is_ok()
            && probe.expect(TokenKind::Identifier).is_ok()
            && probe.check(TokenKind::LeftParen);

        if is_method {
            self.parse_method().map(Member::Method)
        } else {
            self.parse_property().map(Member::Property)
        }
    }

    /// Grammar: `MODIFIERS 'constructor' PARAMS BLOCK`
    fn parse_constructor(&mut self) -> ParseResult<ConstructorDeclaration> {
        let modifiers = self.parse_modifiers();
        let location = self.expect(TokenKind::Constructor)?.location;
        self.filter_modifiers(modifiers, CONSTRUCTOR_MODIFIERS, &location);
        let id = self.next_id();
        let params = self.parse_parameter_list()?;
        let accessibility =
            self.visibility(modifiers, MessageId::AlwaysSpecifyMemberVisibility, &location);
        let body = self.parse_block()?;

        Ok(ConstructorDeclaration {
            id,
            location: Some(location),
            accessibility,
            params,
            body,
        })
    }

    /// Grammar: `MODIFIERS TYPE IDENT PARAMS BLOCK`
    fn parse_method(&mut self) -> ParseResult<MethodDeclaration> {
        let modifiers = self.parse_modifiers();
        let return_type = self.parse_type_name()?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let location = name_token.location;
        self.filter_modifiers(modifiers, MEMBER_MODIFIERS, &location);
        let id = self.next_id();
        let params = self.parse_parameter_list()?;
        let accessibility =
            self.visibility(modifiers, MessageId::AlwaysSpecifyMemberVisibility, &location);
        let body = self.parse_block()?;

        Ok(MethodDeclaration {
            id,
            location: Some(location),
            accessibility,
            return_type,
            name: name_token.text,
            is_static: modifiers.is_static(),
            params,
            body,
        })
    }

    /// Grammar: `MODIFIERS TYPE IDENT ('->' ACCESSORS)? ('=' EXPR)? ';'`
    fn parse_property(&mut self) -> ParseResult<PropertyDeclaration> {
        let modifiers = self.parse_modifiers();
        let type_ref = self.parse_type_name()?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let location = name_token.location;
        self.filter_modifiers(modifiers, MEMBER_MODIFIERS, &location);
        let id = self.next_id();

        let mut get = self.visibility(modifiers, MessageId::AlwaysSpecifyMemberVisibility, &location);
        let mut set = SetAccessibility::NoModify;
        if self.eat(TokenKind::Arrow).is_some() {
            self.parse_property_accessors(&mut get, &mut set, &location)?;
        }

        let initializer = if self.eat(TokenKind::Assign).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(PropertyDeclaration {
            id,
            location: Some(location),
            type_ref,
            name: name_token.text,
            is_static: modifiers.is_static(),
            initializer,
            get_accessibility: get,
            set_accessibility: set,
        })
    }

    /// Grammar: `ACCESSOR (',' ACCESSOR)*` where `ACCESSOR = VISIBILITY? ('get' | 'set')`
    fn parse_property_accessors(
        &mut self,
        get: &mut Accessibility,
        set: &mut SetAccessibility,
        property_location: &SourceLocation,
    ) -> ParseResult<()> {
        let mut assigned_get = false;
        let mut assigned_set = false;

        loop {
            let mut current = *get;
            if let Some(modifier) = self.eat(TokenKind::Modifier) {
                current = match modifier.text.as_str() {
                    "public" => Accessibility::Public,
                    "private" => Accessibility::Private,
                    "internal" => Accessibility::Internal,
                    other => {
                        self.diagnostics.error(
                            MessageId::InapplicableModifier,
                            format!("Unexpected modifier {}", other),
                            Some(modifier.location),
                        );
                        Accessibility::Internal
                    }
                };
            }

            let accessor = self.peek_token()?.clone();
            match accessor.kind {
                TokenKind::Get => {
                    if assigned_get {
                        self.diagnostics.error(
                            MessageId::RepeatedModifier,
                            "Repeated get specifier",
                            Some(accessor.location.clone()),
                        );
                    }
                    assigned_get = true;
                    if current != *get {
                        self.diagnostics.error(
                            MessageId::InconsistentAccessibilityModifiers,
                            "Get accessibility must be the same as the accessibility of the property itself.",
                            Some(accessor.location.clone()),
                        );
                    }
                    *get = current;
                }
                TokenKind::Set => {
                    if assigned_set {
                        self.diagnostics.error(
                            MessageId::RepeatedModifier,
                            "Repeated set specifier",
                            Some(accessor.location.clone()),
                        );
                    }
                    assigned_set = true;
                    *set = SetAccessibility::Access(current);
                    if set.rank() > get.rank() {
                        self.diagnostics.error(
                            MessageId::InconsistentAccessibilityModifiers,
                            "Set accessibility cannot be less restrictive than get",
                            Some(accessor.location.clone()),
                        );
                    }
                }
                _ => {
                    return Err(ParseError::unexpected(
                        format!("Expected get or set specifier, got {}", accessor.kind),
                        Some(accessor.location),
                    ));
                }
            }
            self.tokens.skip();

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        if !assigned_set {
            *set = SetAccessibility::NoModify;
        } else if !assigned_get {
            self.diagnostics.error(
                MessageId::MissingAccessibilityModifier,
                "Cannot have only set specifier (you must add get as well)",
                Some(property_location.clone()),
            );
        }

        if assigned_get && !assigned_set {
            self.diagnostics.warn(
                MessageId::RedundantPropertyAccessibilityModifier,
                "Don't add redundant get specifiers (missing set specifier means readonly anyway)",
                Some(property_location.clone()),
            );
        }

        Ok(())
    }

    /// Grammar: `MODIFIERS ('constructor' | TYPE IDENT) PARAMS '->' '@' IDENT ARGS ';'`
    fn parse_extern_method(&mut self) -> ParseResult<ExternMethodMapping> {
        let modifiers = self.parse_modifiers();

        let (mapped_type, name, location) = match self.eat(TokenKind::Constructor) {
            Some(keyword) => (None, None, keyword.location),
            None => {
                let mapped_type = self.parse_type_name()?;
                let name_token = self.expect(TokenKind::Identifier)?;
                (Some(mapped_type), Some(name_token.text), name_token.location)
            }
        };
        self.filter_modifiers(modifiers, MEMBER_MODIFIERS, &location);
        let id = self.next_id();

        let expected_params = self.parse_parameter_list()?;
        self.expect(TokenKind::Arrow)?;
        self.expect(TokenKind::At)?;
        let native_name = self.expect(TokenKind::Identifier)?.text;
        let passed_args = self.parse_argument_list()?;
        self.expect(TokenKind::Semicolon)?;

        let accessibility =
            self.visibility(modifiers, MessageId::AlwaysSpecifyMemberVisibility, &location);

        Ok(ExternMethodMapping {
            id,
            location: Some(location),
            accessibility,
            mapped_type,
            name,
            is_static: modifiers.is_static(),
            expected_params,
            native_name,
            passed_args,
        })
    }

    /// Grammar: `'(' (TYPE IDENT (',' TYPE IDENT)*)? ')'`
    pub(super) fn parse_parameter_list(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();

        while !self.check(TokenKind::RightParen) {
            let type_ref = self.parse_type_name()?;
            let name_token = self.expect(TokenKind::Identifier)?;
            params.push(Parameter {
                id: self.next_id(),
                location: Some(name_token.location),
                type_ref,
                name: name_token.text,
            });

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
        Ok(params)
    }
}
