//! Reconciliation engine
//!
//! Statement lifecycle and line-item assignment. A statement's reconciled
//! balance, difference, and status are derived on read; creation validates
//! the date range, overlap against sibling statements, and balance
//! continuity against the most recent prior statement, all inside the write
//! transaction so concurrent writers cannot slip a conflicting statement in
//! between validation and insert.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::{LineItemId, Money, Statement, StatementId, StatementStatus};
use crate::storage::LedgerStore;

/// Input for creating a statement
#[derive(Debug, Clone)]
pub struct CreateStatementInput {
    pub account_id: crate::models::AccountId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub beginning_balance: Money,
    pub ending_balance: Money,
}

/// Derived reconciliation state of one statement
#[derive(Debug, Clone)]
pub struct StatementSummary {
    pub statement: Statement,
    /// Sum of the reconciled line items' amounts
    pub reconciled_balance: Money,
    /// The change the bank reports over the period
    pub expected_change: Money,
    /// Expected change minus reconciled balance
    pub difference: Money,
    /// Whether the statement balances (zero difference)
    pub balanced: bool,
    /// Derived lifecycle status
    pub status: StatementStatus,
    /// Number of reconciled line items
    pub line_item_count: usize,
}

/// Service for statement reconciliation
pub struct StatementService<'a> {
    store: &'a LedgerStore,
}

impl<'a> StatementService<'a> {
    /// Create a new statement service
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Create a statement after validating range, overlap, and continuity
    pub fn create(&self, input: CreateStatementInput) -> TallyResult<Statement> {
        self.store.write(|txn| {
            let account = txn
                .doc()
                .account(input.account_id)
                .cloned()
                .ok_or_else(|| TallyError::account_not_found(input.account_id.to_string()))?;

            if account.is_category() {
                return Err(TallyError::Validation(format!(
                    "'{}' is a category; statements reconcile real accounts",
                    account.name
                )));
            }

            if input.end_date <= input.start_date {
                return Err(TallyError::Validation(format!(
                    "statement end date {} must be after start date {}",
                    input.end_date, input.start_date
                )));
            }

            for existing in txn.doc().statements_for_account(input.account_id) {
                if existing.overlaps(input.start_date, input.end_date) {
                    return Err(TallyError::Validation(format!(
                        "statement period {} .. {} overlaps {} ({} .. {})",
                        input.start_date,
                        input.end_date,
                        existing.id,
                        existing.start_date,
                        existing.end_date
                    )));
                }
            }

            // Balance continuity against the most recent prior statement.
            // The very first statement for an account is exempt.
            let prior = txn
                .doc()
                .statements_for_account(input.account_id)
                .into_iter()
                .filter(|s| s.end_date < input.start_date)
                .max_by_key(|s| s.end_date)
                .cloned();
            if let Some(prior) = prior {
                if prior.ending_balance != input.beginning_balance {
                    return Err(TallyError::Validation(format!(
                        "beginning balance {} does not continue from {} which ended at {}",
                        input.beginning_balance, prior.id, prior.ending_balance
                    )));
                }
            }

            let statement = txn.create_statement(
                input.account_id,
                input.start_date,
                input.end_date,
                input.beginning_balance,
                input.ending_balance,
            );
            txn.log_create(
                EntityType::Statement,
                statement.id.to_string(),
                Some(format!("{} {}", account.name, statement)),
                &statement,
            );

            Ok(statement)
        })
    }

    /// Assign line items to a statement and mark them cleared
    ///
    /// All-or-nothing: any failing id aborts the whole call with no partial
    /// assignment. An id already bound to this statement is a per-id no-op.
    /// Returns the number of newly assigned line items.
    pub fn reconcile_line_items(
        &self,
        statement_id: StatementId,
        line_item_ids: &[LineItemId],
    ) -> TallyResult<usize> {
        self.store.write(|txn| {
            let statement = txn
                .doc()
                .statement(statement_id)
                .cloned()
                .ok_or_else(|| TallyError::statement_not_found(statement_id.to_string()))?;

            let mut assigned = 0;
            for &id in line_item_ids {
                let item = txn
                    .doc()
                    .line_item(id)
                    .cloned()
                    .ok_or_else(|| TallyError::line_item_not_found(id.to_string()))?;

                if item.statement_id == Some(statement_id) {
                    // Re-reconciling against the same statement is a no-op
                    continue;
                }

                if item.account_id != Some(statement.account_id) {
                    return Err(TallyError::Validation(format!(
                        "line item {} does not belong to the statement's account",
                        id
                    )));
                }

                let transaction = txn
                    .doc()
                    .transaction(item.transaction_id)
                    .cloned()
                    .ok_or_else(|| {
                        TallyError::transaction_not_found(item.transaction_id.to_string())
                    })?;
                if !statement.covers(transaction.date) {
                    return Err(TallyError::Validation(format!(
                        "line item {} is dated {} outside the statement period {} .. {}",
                        id, transaction.date, statement.start_date, statement.end_date
                    )));
                }

                if let Some(other) = item.statement_id {
                    return Err(TallyError::Validation(format!(
                        "line item {} is already reconciled against {}",
                        id, other
                    )));
                }

                let updated = txn.update_line_item(id, |li| {
                    li.statement_id = Some(statement_id);
                    li.cleared = true;
                })?;
                txn.log_update(
                    EntityType::LineItem,
                    id.to_string(),
                    None,
                    &item,
                    &updated,
                    Some(format!("reconciled against {}", statement_id)),
                );
                assigned += 1;
            }

            Ok(assigned)
        })
    }

    /// Release line items from a statement and clear their cleared flag
    ///
    /// An unassigned id is a no-op; an id bound to a different statement
    /// fails the whole call. Returns the number of released line items.
    pub fn unreconcile_line_items(
        &self,
        statement_id: StatementId,
        line_item_ids: &[LineItemId],
    ) -> TallyResult<usize> {
        self.store.write(|txn| {
            txn.doc()
                .statement(statement_id)
                .ok_or_else(|| TallyError::statement_not_found(statement_id.to_string()))?;

            let mut released = 0;
            for &id in line_item_ids {
                let item = txn
                    .doc()
                    .line_item(id)
                    .cloned()
                    .ok_or_else(|| TallyError::line_item_not_found(id.to_string()))?;

                match item.statement_id {
                    None => continue,
                    Some(other) if other != statement_id => {
                        return Err(TallyError::Validation(format!(
                            "line item {} belongs to {}, not {}",
                            id, other, statement_id
                        )));
                    }
                    Some(_) => {
                        let updated = txn.update_line_item(id, |li| {
                            li.statement_id = None;
                            li.cleared = false;
                        })?;
                        txn.log_update(
                            EntityType::LineItem,
                            id.to_string(),
                            None,
                            &item,
                            &updated,
                            Some(format!("unreconciled from {}", statement_id)),
                        );
                        released += 1;
                    }
                }
            }

            Ok(released)
        })
    }

    /// Delete a statement, unreconciling (not deleting) its line items first
    ///
    /// Returns `false` if the statement does not exist.
    pub fn delete(&self, statement_id: StatementId) -> TallyResult<bool> {
        self.store.write(|txn| {
            let Some(statement) = txn.doc().statement(statement_id).cloned() else {
                return Ok(false);
            };

            let owned: Vec<LineItemId> = txn
                .doc()
                .line_items_for_statement(statement_id)
                .into_iter()
                .map(|li| li.id)
                .collect();

            for id in owned {
                let before = txn.doc().line_item(id).cloned();
                let updated = txn.update_line_item(id, |li| {
                    li.statement_id = None;
                    li.cleared = false;
                })?;
                if let Some(before) = before {
                    txn.log_update(
                        EntityType::LineItem,
                        id.to_string(),
                        None,
                        &before,
                        &updated,
                        Some(format!("unreconciled from deleted {}", statement_id)),
                    );
                }
            }

            let removed = txn.delete_statement(statement_id)?;
            txn.log_delete(
                EntityType::Statement,
                statement_id.to_string(),
                Some(statement.to_string()),
                &removed,
            );

            Ok(true)
        })
    }

    /// Derived reconciliation state of a statement
    pub fn summary(&self, statement_id: StatementId) -> TallyResult<StatementSummary> {
        self.store.read(|doc| {
            let statement = doc
                .statement(statement_id)
                .cloned()
                .ok_or_else(|| TallyError::statement_not_found(statement_id.to_string()))?;

            let items = doc.line_items_for_statement(statement_id);
            let reconciled_balance: Money = items.iter().map(|li| li.amount).sum();
            let expected_change = statement.expected_change();
            let difference = expected_change - reconciled_balance;
            let balanced = difference.is_zero();

            let status = if items.is_empty() {
                StatementStatus::Pending
            } else if balanced {
                StatementStatus::Balanced
            } else {
                StatementStatus::Partial
            };

            Ok(StatementSummary {
                statement,
                reconciled_balance,
                expected_change,
                difference,
                balanced,
                status,
                line_item_count: items.len(),
            })
        })?
    }

    /// Summaries for all of an account's statements, oldest period first
    pub fn list_for_account(
        &self,
        account_id: crate::models::AccountId,
    ) -> TallyResult<Vec<StatementSummary>> {
        let ids: Vec<StatementId> = self.store.read(|doc| {
            let mut statements = doc.statements_for_account(account_id);
            statements.sort_by_key(|s| s.start_date);
            statements.iter().map(|s| s.id).collect()
        })?;

        ids.into_iter().map(|id| self.summary(id)).collect()
    }
}
