//! Typed IDs for type-safe entity references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an expense claim.
///
/// Claims are numbered by the store; ids are monotonic, so ordering by id
/// is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub i64);

impl ExpenseId {
    /// Returns the inner number.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ExpenseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Macro to generate UUID-backed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(JournalEntryId, "Identifier of an audit journal entry.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_id_parse_and_display() {
        let id: ExpenseId = "42".parse().unwrap();
        assert_eq!(id, ExpenseId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<ExpenseId>().is_err());
    }

    #[test]
    fn test_expense_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ExpenseId(7)).unwrap(), "7");
    }

    #[test]
    fn test_journal_ids_are_unique() {
        let first = JournalEntryId::new();
        let second = JournalEntryId::new();
        assert_ne!(first, second);
    }
}
