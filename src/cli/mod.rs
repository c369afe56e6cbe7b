//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod categorize;
pub mod export;
pub mod rule;
pub mod statement;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use categorize::{handle_categorize_command, CategorizeCommands};
pub use export::{handle_export_command, ExportCommands};
pub use rule::{handle_rule_command, RuleCommands};
pub use statement::{handle_statement_command, StatementCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::error::{TallyError, TallyResult};
use crate::models::{Account, Money};
use crate::services::AccountService;
use crate::storage::LedgerStore;

/// Parse a date string or return today's date
pub(crate) fn parse_date_or_today(date_str: Option<&str>) -> TallyResult<NaiveDate> {
    if let Some(date_str) = date_str {
        parse_date(date_str)
    } else {
        Ok(chrono::Local::now().date_naive())
    }
}

/// Parse a YYYY-MM-DD date string
pub(crate) fn parse_date(date_str: &str) -> TallyResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        TallyError::Validation(format!(
            "Invalid date format: '{}'. Use YYYY-MM-DD",
            date_str
        ))
    })
}

/// Parse a money amount string
pub(crate) fn parse_money(s: &str) -> TallyResult<Money> {
    Money::parse(s).map_err(|e| {
        TallyError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '1234.56'. {}",
            s, e
        ))
    })
}

/// Resolve an account argument (ID or name) to an account
pub(crate) fn resolve_account(store: &LedgerStore, identifier: &str) -> TallyResult<Account> {
    AccountService::new(store)
        .find(identifier)?
        .ok_or_else(|| TallyError::account_not_found(identifier))
}

/// Resolve a category argument (ID or name) to a category account
pub(crate) fn resolve_category(store: &LedgerStore, identifier: &str) -> TallyResult<Account> {
    let account = AccountService::new(store)
        .find(identifier)?
        .filter(|a| a.is_category())
        .ok_or_else(|| TallyError::category_not_found(identifier))?;
    Ok(account)
}
