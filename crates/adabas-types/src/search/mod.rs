//! Search expression compiler.
//!
//! A query such as `AA=1 AND BC=[2:5)` is compiled in three steps:
//!
//! 1. [`SearchInfo::new`] lifts quoted literals into a constant table,
//!    leaving `#{N}` placeholders in the query text.
//! 2. [`SearchInfo::generate_tree`] splits on `AND`, then `OR`, parses
//!    each predicate against a [`Definition`](crate::Definition) and builds
//!    a [`SearchTree`].
//! 3. [`SearchTree::search_buffer`] and [`SearchTree::value_buffer`] emit
//!    the two buffers a read request carries.

mod info;
mod literal;
mod tree;

pub use info::SearchInfo;
pub use tree::{SearchNode, SearchTree, SearchValue};

use crate::{AdabasError, Result};

// ── Comparator ─────────────────────────────────────────────────────

/// Comparison applied by one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// No comparator token; used for mainframe range bounds.
    None,
}

impl Comparator {
    /// Parse an operator as written in a query.
    ///
    /// # Errors
    /// Fails with code 170 for anything but `== = != <> <= >= < >`.
    pub fn parse(op: &str, expression: &str) -> Result<Self> {
        match op {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            _ => Err(AdabasError::InvalidComparator {
                expression: expression.to_string(),
            }),
        }
    }

    /// Search buffer token; empty for [`Comparator::None`].
    pub fn token(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::None => "",
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// ── Logic ──────────────────────────────────────────────────────────

/// How the children of a search node combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// All children match.
    And,
    /// Any child matches.
    Or,
    /// Any child matches; every leaf names the same field.
    Mor,
    /// Lower and upper bound of a range.
    Range,
    /// Exclude the child.
    Not,
}

impl Logic {
    /// Separator written between children in the search buffer.
    pub fn separator(self) -> &'static str {
        match self {
            Self::And => "D",
            Self::Or => "R",
            Self::Mor => "O",
            Self::Range => "S",
            Self::Not => "N",
        }
    }
}

impl std::fmt::Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Mor => "MOR",
            Self::Range => "RANGE",
            Self::Not => "NOT",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_parse() {
        assert_eq!(Comparator::parse("=", "").unwrap(), Comparator::Eq);
        assert_eq!(Comparator::parse("==", "").unwrap(), Comparator::Eq);
        assert_eq!(Comparator::parse("<>", "").unwrap(), Comparator::Ne);
        assert_eq!(Comparator::parse(">=", "").unwrap(), Comparator::Ge);
        let err = Comparator::parse("=>", "AA=>1").unwrap_err();
        assert_eq!(err.code(), 170);
    }

    #[test]
    fn test_separators() {
        assert_eq!(Logic::And.separator(), "D");
        assert_eq!(Logic::Mor.separator(), "O");
        assert_eq!(Logic::Not.to_string(), "NOT");
        assert_eq!(Comparator::None.to_string(), "");
    }
}
