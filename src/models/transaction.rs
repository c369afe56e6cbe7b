//! Transaction and line item models
//!
//! A transaction is a dated ledger event that owns a set of line items (its
//! legs). The double-entry invariant requires the signed amounts of a
//! transaction's line items to sum to zero. A line item with no account is an
//! orphaned slot: a legacy anomaly the engine tolerates on read and repairs
//! on category mutation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, LineItemId, StatementId, TransactionId};
use super::money::Money;

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Transaction date (day granularity)
    pub date: NaiveDate,

    /// Payee / title text
    pub payee: String,

    /// Optional note
    #[serde(default)]
    pub memo: String,

    /// Whether the transaction has cleared the bank
    #[serde(default)]
    pub cleared: bool,

    /// Whether the transaction has been voided
    #[serde(default)]
    pub voided: bool,

    /// Monotonic creation counter; the stable intra-day ordering tie-break
    /// used by the balance recalculator
    pub sequence: i64,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(id: TransactionId, date: NaiveDate, payee: impl Into<String>, sequence: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            date,
            payee: payee.into(),
            memo: String::new(),
            cleared: false,
            voided: false,
            sequence,
            created_at: now,
            updated_at: now,
        }
    }

    /// Touch the modification marker
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.payee)
    }
}

/// One leg of a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier
    pub id: LineItemId,

    /// The transaction this line item belongs to
    pub transaction_id: TransactionId,

    /// The account this leg posts to. `None` marks an orphaned slot.
    pub account_id: Option<AccountId>,

    /// Signed amount
    pub amount: Money,

    /// Optional memo for this leg
    #[serde(default)]
    pub memo: String,

    /// Whether this leg has cleared; set by statement reconciliation
    #[serde(default)]
    pub cleared: bool,

    /// The statement this leg is reconciled against, if any
    pub statement_id: Option<StatementId>,

    /// Derived running-balance cache; `None` until the first recalculation.
    /// Never a source of truth.
    pub running_balance: Option<Money>,
}

impl LineItem {
    /// Create a new line item
    pub fn new(
        id: LineItemId,
        transaction_id: TransactionId,
        account_id: Option<AccountId>,
        amount: Money,
    ) -> Self {
        Self {
            id,
            transaction_id,
            account_id,
            amount,
            memo: String::new(),
            cleared: false,
            statement_id: None,
            running_balance: None,
        }
    }

    /// Check whether this is an orphaned slot (no owning account)
    pub fn is_orphaned(&self) -> bool {
        self.account_id.is_none()
    }

    /// Check whether this leg is reconciled against a statement
    pub fn is_reconciled(&self) -> bool {
        self.statement_id.is_some()
    }
}

/// Sum the amounts of a transaction's line items
///
/// Zero for a transaction honoring the double-entry invariant.
pub fn balance_of(items: &[LineItem]) -> Money {
    items.iter().map(|item| item.amount).sum()
}
