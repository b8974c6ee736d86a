// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural relations between views.

/// A structural relationship between two views.
///
/// Relations are read as "x is R of y": `app.has_relation(x, Relation::Ancestor, y)` holds
/// when `x` is an ancestor of `y`. They are evaluated by
/// [`Application::has_relation`](crate::Application::has_relation), and scope message
/// delivery and provision lookup.
///
/// `Ancestor` and `Descendant` are each other's [inverse](Self::inverse); the remaining
/// relations are symmetric.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Both views are attached to windows of the same application, or share a root.
    Any,
    /// Both views share a root.
    Hierarchy,
    /// x is a strict ancestor of y.
    Ancestor,
    /// x is a strict descendant of y.
    Descendant,
    /// x and y are distinct and have the same superview.
    Sibling,
    /// x and y are the same view.
    Self_,
}

impl Relation {
    /// The relation `r'` such that "x is R of y" iff "y is r' of x".
    pub const fn inverse(self) -> Self {
        match self {
            Self::Ancestor => Self::Descendant,
            Self::Descendant => Self::Ancestor,
            other => other,
        }
    }

    /// Returns true if the relation reads the same in both directions.
    pub const fn is_symmetric(self) -> bool {
        !matches!(self, Self::Ancestor | Self::Descendant)
    }

    /// Returns true if provision lookups with this relation fall back to application-level
    /// provisions when no view provides a value.
    pub const fn falls_back_to_application(self) -> bool {
        matches!(self, Self::Hierarchy | Self::Any | Self::Ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_pairs() {
        assert_eq!(Relation::Ancestor.inverse(), Relation::Descendant);
        assert_eq!(Relation::Descendant.inverse(), Relation::Ancestor);
        for r in [
            Relation::Any,
            Relation::Hierarchy,
            Relation::Sibling,
            Relation::Self_,
        ] {
            assert_eq!(r.inverse(), r);
            assert!(r.is_symmetric());
        }
    }
}
