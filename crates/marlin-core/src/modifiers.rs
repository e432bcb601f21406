//! Declaration modifiers and accessibility levels.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// The set of modifiers written before a declaration.
    ///
    /// ```rust
    /// use marlin_core::Modifiers;
    ///
    /// let mods = Modifiers::PUBLIC | Modifiers::STATIC;
    /// assert!(mods.is_static());
    /// assert!(!mods.contains(Modifiers::PRIVATE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL = 1 << 3;
        const STATIC = 1 << 4;

        /// Modifiers that choose a visibility level.
        const VISIBILITY = Self::PUBLIC.bits()
            | Self::PRIVATE.bits()
            | Self::PROTECTED.bits()
            | Self::INTERNAL.bits();
    }
}

impl Modifiers {
    /// Parse a modifier keyword.
    pub fn from_keyword(keyword: &str) -> Option<Modifiers> {
        match keyword {
            "public" => Some(Modifiers::PUBLIC),
            "private" => Some(Modifiers::PRIVATE),
            "protected" => Some(Modifiers::PROTECTED),
            "internal" => Some(Modifiers::INTERNAL),
            "static" => Some(Modifiers::STATIC),
            _ => None,
        }
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    /// Whether any visibility keyword was written.
    pub fn has_visibility(self) -> bool {
        self.intersects(Modifiers::VISIBILITY)
    }

    /// The visibility selected by these modifiers.
    ///
    /// `public` wins over `protected`, which wins over `private`; with none of
    /// them the declaration is `internal`.
    pub fn accessibility(self) -> Accessibility {
        if self.contains(Modifiers::PUBLIC) {
            Accessibility::Public
        } else if self.contains(Modifiers::PROTECTED) {
            Accessibility::Protected
        } else if self.contains(Modifiers::PRIVATE) {
            Accessibility::Private
        } else {
            Accessibility::Internal
        }
    }

    /// Keyword of a single-flag modifier.
    pub fn keyword(self) -> &'static str {
        if self == Modifiers::PUBLIC {
            "public"
        } else if self == Modifiers::PRIVATE {
            "private"
        } else if self == Modifiers::PROTECTED {
            "protected"
        } else if self == Modifiers::INTERNAL {
            "internal"
        } else if self == Modifiers::STATIC {
            "static"
        } else {
            "<modifiers>"
        }
    }
}

/// Visibility of a type or member (and the `get` side of a property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Public,
    Internal,
    Private,
    Protected,
}

impl Accessibility {
    /// Ordering used for property accessor consistency checks.
    pub fn rank(self) -> u8 {
        match self {
            Accessibility::Public => 4,
            Accessibility::Internal => 3,
            Accessibility::Private => 2,
            Accessibility::Protected => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Private => "private",
            Accessibility::Protected => "protected",
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a property's `set` accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetAccessibility {
    /// The property cannot be assigned from outside its initializer.
    #[default]
    NoModify,
    Access(Accessibility),
}

impl SetAccessibility {
    pub fn rank(self) -> u8 {
        match self {
            SetAccessibility::NoModify => 0,
            SetAccessibility::Access(access) => access.rank(),
        }
    }
}

impl fmt::Display for SetAccessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetAccessibility::NoModify => f.write_str("no-modify"),
            SetAccessibility::Access(access) => access.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_map_to_flags() {
        assert_eq!(Modifiers::from_keyword("static"), Some(Modifiers::STATIC));
        assert_eq!(Modifiers::from_keyword("mut"), None);
        assert_eq!(Modifiers::PROTECTED.keyword(), "protected");
    }

    #[test]
    fn visibility_defaults_to_internal() {
        assert_eq!(Modifiers::STATIC.accessibility(), Accessibility::Internal);
        assert!(!Modifiers::STATIC.has_visibility());
        assert_eq!(
            (Modifiers::PRIVATE | Modifiers::PUBLIC).accessibility(),
            Accessibility::Public
        );
    }

    #[test]
    fn set_ranks_below_every_get() {
        assert!(SetAccessibility::NoModify.rank() < Accessibility::Protected.rank());
        assert_eq!(
            SetAccessibility::Access(Accessibility::Public).rank(),
            Accessibility::Public.rank()
        );
    }
}
