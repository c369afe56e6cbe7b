//! Transaction service
//!
//! Creates balanced transactions (a primary leg on a real account plus an
//! optional category leg carrying the negated amount) and provides lookup,
//! filtering, and the per-account register used by display and export.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::{AccountId, LineItem, Money, Transaction, TransactionId};
use crate::services::BalanceService;
use crate::storage::LedgerStore;

/// Service for transaction management
pub struct TransactionService<'a> {
    store: &'a LedgerStore,
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// The real account the money moves through
    pub account_id: AccountId,
    /// Transaction date
    pub date: NaiveDate,
    /// Signed amount of the primary leg (negative for outflow)
    pub amount: Money,
    /// Payee / title text
    pub payee: String,
    /// Category to post the offsetting leg to, if known
    pub category_id: Option<AccountId>,
    /// Optional note
    pub memo: Option<String>,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to transactions with a leg on this account
    pub account_id: Option<AccountId>,
    /// Restrict to payees containing this text (case-insensitive)
    pub payee_contains: Option<String>,
    /// Filter by date range start
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end
    pub end_date: Option<NaiveDate>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by account
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Filter by payee substring
    pub fn payee(mut self, text: impl Into<String>) -> Self {
        self.payee_contains = Some(text.into());
        self
    }

    /// Filter by date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One row of an account register: a line item joined with its transaction
#[derive(Debug, Clone)]
pub struct RegisterEntry {
    pub transaction: Transaction,
    pub line_item: LineItem,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Create a balanced transaction
    ///
    /// Writes the transaction and its legs in one commit, then recalculates
    /// running balances for the affected accounts (separate commits; see the
    /// balance service).
    pub fn create(&self, input: CreateTransactionInput) -> TallyResult<Transaction> {
        let transaction = self.store.write(|txn| {
            let account = txn
                .doc()
                .account(input.account_id)
                .cloned()
                .ok_or_else(|| TallyError::account_not_found(input.account_id.to_string()))?;

            if account.is_category() {
                return Err(TallyError::Validation(format!(
                    "'{}' is a category; transactions post to real accounts",
                    account.name
                )));
            }

            if let Some(category_id) = input.category_id {
                txn.doc()
                    .category(category_id)
                    .ok_or_else(|| TallyError::category_not_found(category_id.to_string()))?;
            }

            let created = txn.create_transaction(input.date, input.payee.trim());
            let transaction = txn.update_transaction(created.id, |t| {
                if let Some(memo) = &input.memo {
                    t.memo = memo.clone();
                }
            })?;

            txn.create_line_item(transaction.id, Some(input.account_id), input.amount);
            if let Some(category_id) = input.category_id {
                txn.create_line_item(transaction.id, Some(category_id), -input.amount);
            }

            txn.log_create(
                EntityType::Transaction,
                transaction.id.to_string(),
                Some(format!("{} {}", transaction.date, transaction.payee)),
                &transaction,
            );

            Ok(transaction)
        })?;

        let mut affected = vec![input.account_id];
        affected.extend(input.category_id);
        BalanceService::new(self.store).recalculate_each(&affected)?;

        Ok(transaction)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> TallyResult<Option<Transaction>> {
        self.store.read(|doc| doc.transaction(id).cloned())
    }

    /// Get a transaction's line items
    pub fn line_items(&self, id: TransactionId) -> TallyResult<Vec<LineItem>> {
        self.store.read(|doc| {
            doc.line_items_for_transaction(id)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// List transactions, newest first
    pub fn list(&self, filter: TransactionFilter) -> TallyResult<Vec<Transaction>> {
        self.store.read(|doc| {
            let needle = filter.payee_contains.as_deref().map(str::to_lowercase);

            let mut transactions: Vec<Transaction> = doc
                .transactions
                .iter()
                .filter(|t| match filter.account_id {
                    Some(account_id) => doc
                        .line_items_for_transaction(t.id)
                        .iter()
                        .any(|li| li.account_id == Some(account_id)),
                    None => true,
                })
                .filter(|t| match &needle {
                    Some(needle) => t.payee.to_lowercase().contains(needle),
                    None => true,
                })
                .filter(|t| filter.start_date.map_or(true, |start| t.date >= start))
                .filter(|t| filter.end_date.map_or(true, |end| t.date <= end))
                .cloned()
                .collect();

            transactions
                .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.sequence.cmp(&a.sequence)));

            if let Some(limit) = filter.limit {
                transactions.truncate(limit);
            }

            transactions
        })
    }

    /// The account register: every line item on the account joined with its
    /// transaction, in running-balance order (date, then creation sequence)
    pub fn register(&self, account_id: AccountId) -> TallyResult<Vec<RegisterEntry>> {
        self.store.read(|doc| {
            let mut entries: Vec<RegisterEntry> = doc
                .line_items_for_account(account_id)
                .into_iter()
                .filter_map(|item| {
                    let transaction = doc.transaction(item.transaction_id)?;
                    Some(RegisterEntry {
                        transaction: transaction.clone(),
                        line_item: item.clone(),
                    })
                })
                .collect();

            entries.sort_by(|a, b| {
                a.transaction
                    .date
                    .cmp(&b.transaction.date)
                    .then_with(|| a.transaction.sequence.cmp(&b.transaction.sequence))
                    .then_with(|| a.line_item.id.cmp(&b.line_item.id))
            });

            entries
        })
    }
}
