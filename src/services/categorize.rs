//! Recategorization engine
//!
//! Moves a transaction's category leg to a new category while preserving the
//! double-entry invariant and repairing orphaned slots left behind by legacy
//! edits. Reassignment prefers rewriting an existing leg over inserting a new
//! one: a transaction that has been recategorized any number of times still
//! has exactly two legs, so nothing downstream mistakes it for a split.

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::{AccountId, LineItem, Money, TransactionId};
use crate::services::BalanceService;
use crate::storage::{LedgerDocument, LedgerStore, WriteTxn};

/// Result of recategorizing one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecategorizeOutcome {
    pub transaction_id: TransactionId,
    pub payee: String,
    /// Name of the category the transaction had before, if any
    pub old_category: Option<String>,
    /// Name of the category assigned
    pub new_category: String,
}

/// Result of a bulk recategorization run
#[derive(Debug, Clone)]
pub struct BulkRecategorizeOutcome {
    /// Per-transaction outcomes, newest transaction first
    pub affected: Vec<RecategorizeOutcome>,
    /// Number of transactions affected
    pub count: usize,
    /// Whether this was a dry run (no writes performed)
    pub dry_run: bool,
}

/// Service for recategorization
pub struct CategorizeService<'a> {
    store: &'a LedgerStore,
}

impl<'a> CategorizeService<'a> {
    /// Create a new categorize service
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Reassign a transaction's category
    ///
    /// One write transaction covers the whole mutation; the running balances
    /// of the affected category accounts are then recalculated in separate
    /// commits (stale-but-repairable if interrupted, never inconsistent).
    pub fn recategorize(
        &self,
        transaction_id: TransactionId,
        category_id: AccountId,
    ) -> TallyResult<RecategorizeOutcome> {
        let (outcome, affected_accounts) = self
            .store
            .write(|txn| Self::recategorize_in_txn(txn, transaction_id, category_id))?;

        BalanceService::new(self.store).recalculate_each(&affected_accounts)?;

        Ok(outcome)
    }

    /// Recategorize every transaction whose payee contains `pattern`
    ///
    /// Matching is a case-insensitive substring test. With
    /// `uncategorized_only`, transactions that already have a category leg
    /// are skipped. A dry run computes the identical `affected` list while
    /// performing zero writes; a live run applies one write transaction per
    /// match and recalculates each affected account once at the end.
    pub fn bulk_recategorize(
        &self,
        pattern: &str,
        category_id: AccountId,
        dry_run: bool,
        uncategorized_only: bool,
    ) -> TallyResult<BulkRecategorizeOutcome> {
        let (new_category, matches) = self.store.read(|doc| {
            let new_category = doc.category(category_id).map(|c| c.name.clone());
            let needle = pattern.to_lowercase();

            let mut matches: Vec<_> = doc
                .transactions
                .iter()
                .filter(|t| t.payee.to_lowercase().contains(&needle))
                .map(|t| {
                    let old_category = Self::category_leg(doc, t.id)
                        .and_then(|leg| leg.account_id)
                        .and_then(|id| doc.account(id))
                        .map(|a| a.name.clone());
                    (t.id, t.date, t.sequence, t.payee.clone(), old_category)
                })
                .filter(|(_, _, _, _, old)| !uncategorized_only || old.is_none())
                .collect();

            matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)));
            (new_category, matches)
        })?;

        let new_category =
            new_category.ok_or_else(|| TallyError::category_not_found(category_id.to_string()))?;

        if dry_run {
            let affected: Vec<RecategorizeOutcome> = matches
                .into_iter()
                .map(|(id, _, _, payee, old_category)| RecategorizeOutcome {
                    transaction_id: id,
                    payee,
                    old_category,
                    new_category: new_category.clone(),
                })
                .collect();
            return Ok(BulkRecategorizeOutcome {
                count: affected.len(),
                affected,
                dry_run: true,
            });
        }

        let mut affected = Vec::with_capacity(matches.len());
        let mut accounts = Vec::new();
        for (id, _, _, _, _) in matches {
            let (outcome, touched) = self
                .store
                .write(|txn| Self::recategorize_in_txn(txn, id, category_id))?;
            affected.push(outcome);
            accounts.extend(touched);
        }

        BalanceService::new(self.store).recalculate_each(&accounts)?;

        Ok(BulkRecategorizeOutcome {
            count: affected.len(),
            affected,
            dry_run: false,
        })
    }

    /// The transaction's category leg: the first line item whose account is a
    /// category. At most one should exist; legacy data may disagree, in which
    /// case only the first is inspected.
    fn category_leg(doc: &LedgerDocument, transaction_id: TransactionId) -> Option<LineItem> {
        doc.line_items_for_transaction(transaction_id)
            .into_iter()
            .find(|item| {
                item.account_id
                    .and_then(|id| doc.account(id))
                    .map(|a| a.is_category())
                    .unwrap_or(false)
            })
            .cloned()
    }

    /// Apply the recategorization algorithm inside one write transaction.
    /// Returns the outcome plus the category accounts whose running balances
    /// are now stale.
    fn recategorize_in_txn(
        txn: &mut WriteTxn,
        transaction_id: TransactionId,
        category_id: AccountId,
    ) -> TallyResult<(RecategorizeOutcome, Vec<AccountId>)> {
        let transaction = txn
            .doc()
            .transaction(transaction_id)
            .cloned()
            .ok_or_else(|| TallyError::transaction_not_found(transaction_id.to_string()))?;

        let new_category = txn
            .doc()
            .category(category_id)
            .cloned()
            .ok_or_else(|| TallyError::category_not_found(category_id.to_string()))?;

        let items: Vec<LineItem> = txn
            .doc()
            .line_items_for_transaction(transaction_id)
            .into_iter()
            .cloned()
            .collect();

        let category_item = Self::category_leg(txn.doc(), transaction_id);
        let orphans: Vec<LineItem> = items.iter().filter(|li| li.is_orphaned()).cloned().collect();

        let mut affected = vec![category_id];
        let old_category;

        if let Some(category_item) = category_item {
            // Rewrite the existing category leg and sweep out every orphan.
            old_category = category_item
                .account_id
                .and_then(|id| txn.doc().account(id))
                .map(|a| a.name.clone());
            if let Some(old_id) = category_item.account_id {
                affected.push(old_id);
            }

            for orphan in &orphans {
                let removed = txn.delete_line_item(orphan.id)?;
                txn.log_delete(
                    EntityType::LineItem,
                    removed.id.to_string(),
                    None,
                    &removed,
                );
            }

            // The leg must offset whatever remains on the other side
            let other_sum: Money = items
                .iter()
                .filter(|li| li.id != category_item.id && !li.is_orphaned())
                .map(|li| li.amount)
                .sum();

            let updated = txn.update_line_item(category_item.id, |item| {
                item.account_id = Some(category_id);
                item.amount = -other_sum;
            })?;
            txn.log_update(
                EntityType::LineItem,
                updated.id.to_string(),
                None,
                &category_item,
                &updated,
                None,
            );
        } else if let Some(first_orphan) = orphans.first() {
            // Reuse the orphaned slot instead of inserting a fresh leg; any
            // surplus orphans are removed along the way.
            old_category = None;

            for orphan in orphans.iter().skip(1) {
                let removed = txn.delete_line_item(orphan.id)?;
                txn.log_delete(
                    EntityType::LineItem,
                    removed.id.to_string(),
                    None,
                    &removed,
                );
            }

            let other_sum: Money = items
                .iter()
                .filter(|li| !li.is_orphaned())
                .map(|li| li.amount)
                .sum();

            let updated = txn.update_line_item(first_orphan.id, |item| {
                item.account_id = Some(category_id);
                item.amount = -other_sum;
            })?;
            txn.log_update(
                EntityType::LineItem,
                updated.id.to_string(),
                None,
                first_orphan,
                &updated,
                None,
            );
        } else {
            // Uncategorized single-leg transaction: append the offsetting leg
            old_category = None;

            let other_sum: Money = items.iter().map(|li| li.amount).sum();
            let created = txn.create_line_item(transaction_id, Some(category_id), -other_sum);
            txn.log_create(EntityType::LineItem, created.id.to_string(), None, &created);
        }

        let before = transaction.clone();
        let touched = txn.update_transaction(transaction_id, |t| t.touch())?;
        txn.log_update(
            EntityType::Transaction,
            transaction_id.to_string(),
            Some(format!("{} {}", touched.date, touched.payee)),
            &before,
            &touched,
            Some(format!("category -> {}", new_category.name)),
        );

        Ok((
            RecategorizeOutcome {
                transaction_id,
                payee: transaction.payee,
                old_category,
                new_category: new_category.name,
            },
            affected,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::models::{balance_of, AccountKind};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn open_test_store() -> (TempDir, LedgerStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = LedgerStore::open(paths).unwrap();
        (temp_dir, store)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        checking: AccountId,
        groceries: AccountId,
        dining: AccountId,
    }

    fn setup(store: &LedgerStore) -> Fixture {
        store
            .write(|txn| {
                let checking = txn.create_account("Checking", AccountKind::Checking, None);
                let groceries = txn.create_account("Groceries", AccountKind::Expense, None);
                let dining = txn.create_account("Dining", AccountKind::Expense, None);
                Ok(Fixture {
                    checking: checking.id,
                    groceries: groceries.id,
                    dining: dining.id,
                })
            })
            .unwrap()
    }

    /// Build a transaction with the given legs (account, cents); `None` makes
    /// an orphaned slot.
    fn seed_transaction(
        store: &LedgerStore,
        payee: &str,
        legs: &[(Option<AccountId>, i64)],
    ) -> TransactionId {
        store
            .write(|txn| {
                let t = txn.create_transaction(date(2025, 1, 15), payee);
                for (account, cents) in legs {
                    txn.create_line_item(t.id, *account, Money::from_cents(*cents));
                }
                Ok(t.id)
            })
            .unwrap()
    }

    fn items_of(store: &LedgerStore, id: TransactionId) -> Vec<LineItem> {
        store
            .read(|doc| {
                doc.line_items_for_transaction(id)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap()
    }

    #[test]
    fn test_recategorize_moves_existing_category_leg() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(
            &store,
            "Market",
            &[(Some(fx.checking), -5000), (Some(fx.groceries), 5000)],
        );

        let outcome = CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        assert_eq!(outcome.old_category.as_deref(), Some("Groceries"));
        assert_eq!(outcome.new_category, "Dining");

        let items = items_of(&store, txn_id);
        assert_eq!(items.len(), 2);
        assert!(balance_of(&items).is_zero());

        let category_leg = items
            .iter()
            .find(|li| li.account_id == Some(fx.dining))
            .unwrap();
        assert_eq!(category_leg.amount.cents(), 5000);
    }

    #[test]
    fn test_recategorize_reuses_orphan_slot() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(&store, "Power Co", &[(None, 0), (Some(fx.checking), -3000)]);

        let outcome = CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        assert_eq!(outcome.old_category, None);

        // The slot was reused, not replaced: still two legs, no insert
        let items = items_of(&store, txn_id);
        assert_eq!(items.len(), 2);
        assert!(balance_of(&items).is_zero());

        let reused = items
            .iter()
            .find(|li| li.account_id == Some(fx.dining))
            .unwrap();
        assert_eq!(reused.amount.cents(), 3000);
    }

    #[test]
    fn test_recategorize_appends_leg_when_uncategorized() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(&store, "Cinema", &[(Some(fx.checking), -2000)]);

        CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        let items = items_of(&store, txn_id);
        assert_eq!(items.len(), 2);
        assert!(balance_of(&items).is_zero());

        let created = items
            .iter()
            .find(|li| li.account_id == Some(fx.dining))
            .unwrap();
        assert_eq!(created.amount.cents(), 2000);
    }

    #[test]
    fn test_recategorize_sweeps_orphans_next_to_category_leg() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        // A nonzero orphan: deleting it must not break double entry
        let txn_id = seed_transaction(
            &store,
            "Market",
            &[
                (Some(fx.checking), -5000),
                (Some(fx.groceries), 4000),
                (None, 1000),
            ],
        );

        CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        let items = items_of(&store, txn_id);
        assert_eq!(items.len(), 2);
        assert!(balance_of(&items).is_zero());
        assert!(items.iter().all(|li| !li.is_orphaned()));

        let category_leg = items
            .iter()
            .find(|li| li.account_id == Some(fx.dining))
            .unwrap();
        assert_eq!(category_leg.amount.cents(), 5000);
    }

    #[test]
    fn test_recategorize_removes_surplus_orphans() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(
            &store,
            "Power Co",
            &[(None, 0), (None, 0), (Some(fx.checking), -3000)],
        );

        CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        let items = items_of(&store, txn_id);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|li| !li.is_orphaned()));
    }

    #[test]
    fn test_recategorize_touches_modification_marker() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(&store, "Market", &[(Some(fx.checking), -2000)]);
        let before = store
            .read(|doc| doc.transaction(txn_id).unwrap().updated_at)
            .unwrap();

        CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        let after = store
            .read(|doc| doc.transaction(txn_id).unwrap().updated_at)
            .unwrap();
        assert!(after >= before);
    }

    #[test]
    fn test_recategorize_updates_category_running_balances() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(
            &store,
            "Market",
            &[(Some(fx.checking), -5000), (Some(fx.groceries), 5000)],
        );

        CategorizeService::new(&store)
            .recategorize(txn_id, fx.dining)
            .unwrap();

        store
            .read(|doc| {
                let dining_items = doc.line_items_for_account(fx.dining);
                assert_eq!(dining_items.len(), 1);
                assert_eq!(dining_items[0].running_balance.unwrap().cents(), 5000);
                assert!(doc.line_items_for_account(fx.groceries).is_empty());
            })
            .unwrap();
    }

    #[test]
    fn test_recategorize_missing_transaction() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);

        let err = CategorizeService::new(&store)
            .recategorize(TransactionId::from_raw(999), fx.dining)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_recategorize_target_must_be_category() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        let txn_id = seed_transaction(&store, "Market", &[(Some(fx.checking), -2000)]);

        // A real account is not found by a category lookup
        let err = CategorizeService::new(&store)
            .recategorize(txn_id, fx.checking)
            .unwrap_err();
        assert!(err.is_not_found());

        // And nothing was changed
        assert_eq!(items_of(&store, txn_id).len(), 1);
    }

    #[test]
    fn test_bulk_dry_run_matches_live_run() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        seed_transaction(
            &store,
            "Acme Corp",
            &[(Some(fx.checking), -5000), (Some(fx.groceries), 5000)],
        );
        seed_transaction(&store, "ACME store", &[(Some(fx.checking), -2000)]);
        seed_transaction(&store, "Other", &[(Some(fx.checking), -1000)]);

        let service = CategorizeService::new(&store);

        let dry = service
            .bulk_recategorize("acme", fx.dining, true, false)
            .unwrap();
        assert!(dry.dry_run);
        assert_eq!(dry.count, 2);

        // Zero writes were performed
        store
            .read(|doc| {
                assert!(doc.line_items_for_account(fx.dining).is_empty());
            })
            .unwrap();

        let live = service
            .bulk_recategorize("acme", fx.dining, false, false)
            .unwrap();
        assert!(!live.dry_run);
        assert_eq!(live.affected, dry.affected);
    }

    #[test]
    fn test_bulk_uncategorized_only() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        seed_transaction(
            &store,
            "Acme Corp",
            &[(Some(fx.checking), -5000), (Some(fx.groceries), 5000)],
        );
        let uncategorized = seed_transaction(&store, "Acme Depot", &[(Some(fx.checking), -2000)]);

        let outcome = CategorizeService::new(&store)
            .bulk_recategorize("acme", fx.dining, false, true)
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.affected[0].transaction_id, uncategorized);
        assert_eq!(outcome.affected[0].old_category, None);
    }

    #[test]
    fn test_bulk_unknown_category() {
        let (_temp_dir, store) = open_test_store();
        setup(&store);

        let err = CategorizeService::new(&store)
            .bulk_recategorize("acme", AccountId::from_raw(999), true, false)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
