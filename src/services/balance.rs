//! Balance recalculator
//!
//! Rebuilds the running-balance cache on an account's line items. The cache
//! is derived data: recalculation is idempotent and may be re-run at any
//! time, so it commits separately from whatever mutation made it stale.
//! Callers that move line items between accounts are responsible for invoking
//! it with the affected account set; the store does not auto-detect staleness.

use std::collections::BTreeSet;

use crate::error::TallyResult;
use crate::models::{AccountId, Money};
use crate::storage::LedgerStore;

/// Service recomputing per-account running balances
pub struct BalanceService<'a> {
    store: &'a LedgerStore,
}

impl<'a> BalanceService<'a> {
    /// Create a new balance service
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Recompute the running balances of every line item on an account
    ///
    /// Line items are ordered by transaction date ascending, then by the
    /// transaction's creation sequence, then by line-item key; each receives
    /// the cumulative sum of amounts up to and including itself. An account
    /// with no line items (including an unknown account id) is a no-op.
    /// Returns the number of line items updated.
    pub fn recalculate(&self, account_id: AccountId) -> TallyResult<usize> {
        self.store.write(|txn| {
            let mut entries: Vec<_> = txn
                .doc()
                .line_items_for_account(account_id)
                .into_iter()
                .filter_map(|item| {
                    let transaction = txn.doc().transaction(item.transaction_id)?;
                    Some((transaction.date, transaction.sequence, item.id, item.amount))
                })
                .collect();

            entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

            let mut running = Money::zero();
            for (_, _, item_id, amount) in &entries {
                running += *amount;
                let balance = running;
                txn.update_line_item(*item_id, |item| {
                    item.running_balance = Some(balance);
                })?;
            }

            Ok(entries.len())
        })
    }

    /// Recalculate a set of accounts, each in its own commit
    ///
    /// Duplicates are collapsed so every affected account is recomputed once.
    pub fn recalculate_each(&self, accounts: &[AccountId]) -> TallyResult<()> {
        let unique: BTreeSet<AccountId> = accounts.iter().copied().collect();
        for account_id in unique {
            self.recalculate(account_id)?;
        }
        Ok(())
    }
}
