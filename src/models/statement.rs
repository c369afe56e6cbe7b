//! Statement model
//!
//! A statement is a reconciliation period for one real account with a
//! beginning and ending balance taken from the bank. Reconciled balance,
//! difference, and status are derived on read, never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, StatementId};
use super::money::Money;

/// A bank statement covering an inclusive date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// Unique identifier
    pub id: StatementId,

    /// The real account this statement reconciles
    pub account_id: AccountId,

    /// First day covered (inclusive)
    pub start_date: NaiveDate,

    /// Last day covered (inclusive)
    pub end_date: NaiveDate,

    /// Balance at the start of the period
    pub beginning_balance: Money,

    /// Balance at the end of the period
    pub ending_balance: Money,

    /// When the statement was created
    pub created_at: DateTime<Utc>,

    /// When the statement was last modified
    pub updated_at: DateTime<Utc>,
}

impl Statement {
    /// Create a new statement
    pub fn new(
        id: StatementId,
        account_id: AccountId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        beginning_balance: Money,
        ending_balance: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            account_id,
            start_date,
            end_date,
            beginning_balance,
            ending_balance,
            created_at: now,
            updated_at: now,
        }
    }

    /// The change the bank reports over the period
    pub fn expected_change(&self) -> Money {
        self.ending_balance - self.beginning_balance
    }

    /// Check whether a date falls inside the statement period
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Check whether this statement's period overlaps another period
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date < end && self.end_date > start
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {} ({} -> {})",
            self.start_date, self.end_date, self.beginning_balance, self.ending_balance
        )
    }
}

/// Derived reconciliation state of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementStatus {
    /// No line items reconciled yet
    Pending,
    /// Some line items reconciled, difference is nonzero
    Partial,
    /// Reconciled balance matches the expected change
    Balanced,
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Partial => write!(f, "Partial"),
            Self::Balanced => write!(f, "Balanced"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(start: (i32, u32, u32), end: (i32, u32, u32)) -> Statement {
        Statement::new(
            StatementId::from_raw(1),
            AccountId::from_raw(1),
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            Money::from_cents(100_000),
            Money::from_cents(120_000),
        )
    }

    #[test]
    fn test_expected_change() {
        let stmt = statement((2025, 2, 1), (2025, 2, 28));
        assert_eq!(stmt.expected_change().cents(), 20_000);
    }

    #[test]
    fn test_covers() {
        let stmt = statement((2025, 2, 1), (2025, 2, 28));
        assert!(stmt.covers(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(stmt.covers(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()));
        assert!(!stmt.covers(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
        assert!(!stmt.covers(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
    }

    #[test]
    fn test_overlaps() {
        let stmt = statement((2025, 2, 1), (2025, 2, 28));

        // Overlapping range
        assert!(stmt.overlaps(
            NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        ));

        // Disjoint range
        assert!(!stmt.overlaps(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
        ));

        // Ranges sharing only a boundary day do not overlap (strict test)
        assert!(!stmt.overlaps(
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
        ));
    }

    #[test]
    fn test_serialization() {
        let stmt = statement((2025, 2, 1), (2025, 2, 28));
        let json = serde_json::to_string(&stmt).unwrap();
        let deserialized: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt.id, deserialized.id);
        assert_eq!(stmt.beginning_balance, deserialized.beginning_balance);
    }
}
