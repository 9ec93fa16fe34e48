//! Three-valued result of an equality query.

use serde::{Deserialize, Serialize};

/// Outcome of a strategy that may be unable to decide.
///
/// - `True`: equality established
/// - `False`: inequality established (or, for refuters, refuted)
/// - `Unknown`: the strategy could not decide within its budget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Truth {
    True,
    False,
    #[default]
    Unknown,
}

impl Truth {
    #[inline]
    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == Truth::False
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Truth::Unknown
    }

    /// Collapse to a boolean: only `True` counts.
    #[inline]
    pub fn to_bool(self) -> bool {
        self.is_true()
    }

    /// Conjunction where `False` dominates `Unknown`.
    pub fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }
}
