//! Core data models for Tally
//!
//! Accounts, transactions and line items, statements, import rules, and the
//! supporting id/money primitives.

pub mod account;
pub mod ids;
pub mod money;
pub mod rule;
pub mod statement;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use ids::{AccountId, LineItemId, RuleId, StatementId, TemplateId, TransactionId};
pub use money::Money;
pub use rule::{ImportRule, Template, TemplateLineItem};
pub use statement::{Statement, StatementStatus};
pub use transaction::{balance_of, LineItem, Transaction};
