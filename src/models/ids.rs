//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time. Keys are store-assigned integers from the
//! ledger document's monotonic counters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store key
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying store key
            pub const fn raw(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Accept both the bare key and the prefixed display form
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(AccountId, "acct-");
define_id!(TransactionId, "txn-");
define_id!(LineItemId, "item-");
define_id!(StatementId, "stmt-");
define_id!(RuleId, "rule-");
define_id!(TemplateId, "tmpl-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = AccountId::from_raw(42);
        assert_eq!(format!("{}", id), "acct-42");
    }

    #[test]
    fn test_id_parse() {
        let id: AccountId = "acct-42".parse().unwrap();
        assert_eq!(id.raw(), 42);

        let bare: AccountId = "42".parse().unwrap();
        assert_eq!(bare, id);

        assert!("acct-abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_id_equality() {
        let id1 = TransactionId::from_raw(7);
        let id2 = id1;
        assert_eq!(id1, id2);

        let id3 = TransactionId::from_raw(8);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_id_serialization() {
        let id = StatementId::from_raw(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "3");

        let deserialized: StatementId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_different_id_types_not_mixable() {
        // This test documents that different ID types are distinct at compile time
        let account_id = AccountId::from_raw(1);
        let transaction_id = TransactionId::from_raw(1);

        // These are different types - can't be compared directly.
        // But we can compare their underlying keys if needed.
        assert_eq!(account_id.raw(), transaction_id.raw());
    }
}
