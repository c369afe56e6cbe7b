//! Account model
//!
//! Accounts cover both real-world accounts (checking, savings, credit, ...)
//! and ledger categories (income/expense). The classification is fixed at
//! creation; the engine never mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;

/// Classification of an account
///
/// `Income` and `Expense` are category accounts; everything else is a real
/// (primary) account that can hold statements and be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Checking account
    Checking,
    /// Savings account
    Savings,
    /// Credit card
    Credit,
    /// Cash/wallet
    Cash,
    /// Investment account
    Investment,
    /// Income category
    Income,
    /// Expense category
    Expense,
}

impl AccountKind {
    /// Returns true if this kind represents a ledger category rather than a
    /// real-world account
    pub fn is_category(&self) -> bool {
        matches!(self, Self::Income | Self::Expense)
    }

    /// Parse an account kind from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "checking" => Some(Self::Checking),
            "savings" => Some(Self::Savings),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "cash" => Some(Self::Cash),
            "investment" => Some(Self::Investment),
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl Default for AccountKind {
    fn default() -> Self {
        Self::Checking
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Savings => write!(f, "Savings"),
            Self::Credit => write!(f, "Credit Card"),
            Self::Cash => write!(f, "Cash"),
            Self::Investment => write!(f, "Investment"),
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// An account or ledger category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,

    /// Account name (e.g., "Chase Checking" or "Groceries")
    pub name: String,

    /// Classification; never changes after creation
    pub kind: AccountKind,

    /// Parent category. Only category accounts may have a parent, and the
    /// parent must itself be a category (tree structure, no cycles).
    pub parent_id: Option<AccountId>,

    /// Notes about this account
    #[serde(default)]
    pub notes: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with default values
    pub fn new(id: AccountId, name: impl Into<String>, kind: AccountKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            kind,
            parent_id: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new category account under a parent category
    pub fn new_child_category(
        id: AccountId,
        name: impl Into<String>,
        kind: AccountKind,
        parent_id: AccountId,
    ) -> Self {
        let mut account = Self::new(id, name, kind);
        account.parent_id = Some(parent_id);
        account
    }

    /// Check whether this account is a ledger category
    pub fn is_category(&self) -> bool {
        self.kind.is_category()
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        if self.parent_id.is_some() && !self.is_category() {
            return Err(AccountValidationError::ParentOnRealAccount);
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    ParentOnRealAccount,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
            Self::ParentOnRealAccount => {
                write!(f, "Only category accounts may have a parent category")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}
