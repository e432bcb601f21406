//! Diagnostics reported by the tokenizer, parser and resolver.
//!
//! Every user-facing problem is a [`Diagnostic`] with a stable numeric
//! [`MessageId`]. Diagnostics are accumulated in a [`Diagnostics`] collection
//! rather than returned as errors, so one run can surface many problems.

use crate::SourceLocation;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Stable identifiers for every diagnostic the frontend can emit.
///
/// The numeric value is part of the public contract: 1xxx are lexical,
/// 2xxx syntactic, 3xxx semantic and 4xxx style diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum MessageId {
    // =========================================================================
    // Lexer
    // =========================================================================
    /// A character that no tokenizer rule accepts.
    InvalidCharacter = 1001,

    // =========================================================================
    // Parser
    // =========================================================================
    /// Parsing of a file stopped early.
    ParsingCancelled = 2001,
    /// A declaration reuses a name already taken in the same scope.
    SymbolAlreadyDefined = 2002,
    /// A non-static extern type is missing its `@NativeType` name.
    ExpectedLlvmTypeName = 2003,
    /// A modifier that does not apply to the declaration it precedes.
    InapplicableModifier = 2004,
    /// A modifier (or property accessor) written twice.
    RepeatedModifier = 2005,
    /// Property accessor visibilities contradict each other.
    InconsistentAccessibilityModifiers = 2006,
    /// A property declares `set` without `get`.
    MissingAccessibilityModifier = 2007,
    /// A token other than the one the grammar requires.
    UnexpectedToken = 2008,
    /// The right side of `.` cannot be indexed into.
    ExpressionNotIndexable = 2009,
    /// A class inherits from a nullable type.
    NullableTypeInheritance = 2010,

    // =========================================================================
    // Semantic analysis
    // =========================================================================
    VariableNotFound = 3001,
    MemberNotFound = 3002,
    UnknownType = 3003,
    AssignedValueDoesNotMatchType = 3004,
    StaticMethodCallOnInstance = 3005,
    InstanceMethodCallOnTypeName = 3006,
    GenericArgsOnNonGenericType = 3007,
    GenericArgsDoNotMatchParams = 3008,
    InstancePropertyAssignmentOnTypeName = 3009,
    StaticPropertyAssignmentOnInstance = 3010,
    ArgumentCountMismatch = 3011,
    UninitializedVariableUsage = 3012,
    MethodCallOnVoid = 3013,
    InvalidGenericArguments = 3014,
    ReturningInvalidType = 3015,
    ReturningValueFromVoidMethod = 3016,
    NotAllCodePathsReturn = 3017,
    ReturningVoidFromNonVoidMethod = 3018,
    NullableTypeNotClass = 3019,
    CannotAssignNullToType = 3020,
    GenericParamTypeCannotBeInstantiated = 3021,

    // =========================================================================
    // Style
    // =========================================================================
    RedundantPropertyAccessibilityModifier = 4001,
    AlwaysSpecifyTypeVisibility = 4002,
    AlwaysSpecifyMemberVisibility = 4003,
}

impl MessageId {
    /// The numeric code of this id.
    pub fn code(self) -> u16 {
        self.into()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MN{}", self.code())
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fatality {
    Information,
    Warning,
    /// Blocks handing the program to a backend.
    Severe,
}

impl Fatality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fatality::Information => "info",
            Fatality::Warning => "warning",
            Fatality::Severe => "error",
        }
    }
}

impl fmt::Display for Fatality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: MessageId,
    pub message: String,
    pub fatality: Fatality,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(
        id: MessageId,
        message: impl Into<String>,
        fatality: Fatality,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            fatality,
            location,
        }
    }

    /// Whether this diagnostic blocks backend invocation.
    pub fn is_severe(&self) -> bool {
        self.fatality == Fatality::Severe
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "{} {} at {}: {}",
                self.fatality, self.id, location, self.message
            ),
            None => write!(f, "{} {}: {}", self.fatality, self.id, self.message),
        }
    }
}

/// An ordered collection of diagnostics.
///
/// Order is discovery order. Collections from independent tasks are combined
/// with [`Diagnostics::extend`], which keeps each collection's internal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Record a severe diagnostic.
    pub fn error(
        &mut self,
        id: MessageId,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) {
        self.push(Diagnostic::new(id, message, Fatality::Severe, location));
    }

    /// Record a warning.
    pub fn warn(&mut self, id: MessageId, message: impl Into<String>, location: Option<SourceLocation>) {
        self.push(Diagnostic::new(id, message, Fatality::Warning, location));
    }

    /// Record an informational message.
    pub fn info(&mut self, id: MessageId, message: impl Into<String>, location: Option<SourceLocation>) {
        self.push(Diagnostic::new(id, message, Fatality::Information, location));
    }

    /// Append all diagnostics of `other`, preserving their order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of severe diagnostics.
    pub fn severe_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_severe()).count()
    }

    /// Whether any diagnostic is severe.
    pub fn has_fatal_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_severe)
    }

    /// Number of diagnostics with the given id.
    pub fn count_of(&self, id: MessageId) -> usize {
        self.items.iter().filter(|d| d.id == id).count()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.items.iter().any(|d| d.id == id)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

/// Outcome of a frontend run, derived purely from its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// No diagnostics at all.
    Success,
    /// Only warnings or informational messages.
    SuccessWithMessages,
    /// At least one severe diagnostic.
    Failure,
}

impl ResultCode {
    pub fn from_diagnostics(diagnostics: &Diagnostics) -> Self {
        if diagnostics.has_fatal_errors() {
            ResultCode::Failure
        } else if diagnostics.is_empty() {
            ResultCode::Success
        } else {
            ResultCode::SuccessWithMessages
        }
    }

    /// Process exit code for this result.
    pub fn exit_code(self) -> i32 {
        match self {
            ResultCode::Success => 0,
            ResultCode::SuccessWithMessages => 1,
            ResultCode::Failure => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("a.mn"), 1, 1)
    }

    #[test]
    fn message_id_codes_roundtrip_through_num_enum() {
        assert_eq!(MessageId::InvalidCharacter.code(), 1001);
        assert_eq!(MessageId::UnexpectedToken.code(), 2008);
        assert_eq!(MessageId::GenericParamTypeCannotBeInstantiated.code(), 3021);
        assert_eq!(
            MessageId::try_from(3011u16).ok(),
            Some(MessageId::ArgumentCountMismatch)
        );
        assert!(MessageId::try_from(9999u16).is_err());
    }

    #[test]
    fn result_code_buckets() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(ResultCode::from_diagnostics(&diagnostics), ResultCode::Success);

        diagnostics.warn(MessageId::AlwaysSpecifyTypeVisibility, "w", Some(loc()));
        assert_eq!(
            ResultCode::from_diagnostics(&diagnostics),
            ResultCode::SuccessWithMessages
        );

        diagnostics.error(MessageId::UnknownType, "e", Some(loc()));
        assert_eq!(ResultCode::from_diagnostics(&diagnostics), ResultCode::Failure);
        assert_eq!(ResultCode::Failure.exit_code(), 2);
    }

    #[test]
    fn extend_preserves_order() {
        let mut first = Diagnostics::new();
        first.error(MessageId::InvalidCharacter, "one", None);
        let mut second = Diagnostics::new();
        second.info(MessageId::ParsingCancelled, "two", None);
        second.error(MessageId::UnexpectedToken, "three", None);

        first.extend(second);
        let messages: Vec<_> = first.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["one", "two", "three"]);
        assert_eq!(first.severe_count(), 2);
        assert_eq!(first.count_of(MessageId::ParsingCancelled), 1);
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(MessageId::UnknownType, "Unknown type x", Fatality::Severe, Some(loc()));
        assert_eq!(d.to_string(), "error MN3003 at a.mn:1:1: Unknown type x");
    }
}
