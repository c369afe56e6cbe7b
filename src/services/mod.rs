//! Service layer for Tally
//!
//! The service layer provides business logic on top of the storage layer.
//! The consistency engine lives here: balance recalculation, single and bulk
//! recategorization, statement reconciliation, and category suggestions,
//! plus the account/transaction/rule management they lean on.

pub mod account;
pub mod balance;
pub mod categorize;
pub mod rule;
pub mod statement;
pub mod suggest;
pub mod transaction;

pub use account::AccountService;
pub use balance::BalanceService;
pub use categorize::{BulkRecategorizeOutcome, CategorizeService, RecategorizeOutcome};
pub use rule::RuleService;
pub use statement::{CreateStatementInput, StatementService, StatementSummary};
pub use suggest::{CategorySuggestion, SuggestionService};
pub use transaction::{
    CreateTransactionInput, RegisterEntry, TransactionFilter, TransactionService,
};
