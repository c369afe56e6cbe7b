//! Suggestion engine
//!
//! Merges two category sources for a merchant name: import rules whose
//! regex pattern matches (fixed high confidence), and the categories used by
//! recent transactions with a similar payee (confidence scaled by share of
//! the sample). A category produced by a rule is never duplicated by the
//! historical source.

use std::collections::HashSet;

use crate::error::TallyResult;
use crate::models::AccountId;
use crate::storage::LedgerStore;

/// Confidence assigned to every rule-based suggestion
const RULE_CONFIDENCE: f64 = 0.9;

/// A scored category suggestion
#[derive(Debug, Clone)]
pub struct CategorySuggestion {
    pub category_id: AccountId,
    pub category_name: String,
    /// Full hierarchical path name
    pub category_path: String,
    /// 0.0 .. 1.0, higher is more confident
    pub confidence: f64,
    /// Why this category was suggested
    pub reason: String,
    /// Historical occurrences backing the suggestion (0 for rule hits)
    pub match_count: usize,
}

/// Service for category suggestions
pub struct SuggestionService<'a> {
    store: &'a LedgerStore,
    /// Upper bound on how many recent matching transactions are sampled
    sample_size: usize,
}

impl<'a> SuggestionService<'a> {
    /// Create a new suggestion service with the given history sample bound
    pub fn new(store: &'a LedgerStore, sample_size: usize) -> Self {
        Self { store, sample_size }
    }

    /// Suggest categories for a merchant name, highest confidence first
    pub fn suggest(&self, merchant: &str) -> TallyResult<Vec<CategorySuggestion>> {
        self.store.read(|doc| {
            let mut suggestions: Vec<CategorySuggestion> = Vec::new();
            let mut seen: HashSet<AccountId> = HashSet::new();

            // Rule-based source: every matching rule contributes the category
            // accounts referenced by its template's legs. Malformed patterns
            // are skipped, not fatal.
            for rule in &doc.rules {
                if rule.matches(merchant) != Some(true) {
                    continue;
                }
                let Some(template) = doc.template(rule.template_id) else {
                    continue;
                };
                for leg in &template.line_items {
                    let Some(category) = leg.account_id.and_then(|id| doc.category(id)) else {
                        continue;
                    };
                    if !seen.insert(category.id) {
                        continue;
                    }
                    suggestions.push(CategorySuggestion {
                        category_id: category.id,
                        category_name: category.name.clone(),
                        category_path: doc
                            .account_path(category.id)
                            .unwrap_or_else(|| category.name.clone()),
                        confidence: RULE_CONFIDENCE,
                        reason: format!("matches rule pattern '{}'", rule.pattern),
                        match_count: 0,
                    });
                }
            }

            // Historical source: tally category legs across the most recent
            // transactions whose payee contains the merchant name.
            let needle = merchant.to_lowercase();
            let mut matched: Vec<_> = doc
                .transactions
                .iter()
                .filter(|t| t.payee.to_lowercase().contains(&needle))
                .collect();
            matched.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.sequence.cmp(&a.sequence)));
            matched.truncate(self.sample_size);

            let total = matched.len();
            let mut tallies: Vec<(AccountId, usize)> = Vec::new();
            for transaction in &matched {
                for item in doc.line_items_for_transaction(transaction.id) {
                    let Some(category) = item.account_id.and_then(|id| doc.category(id)) else {
                        continue;
                    };
                    match tallies.iter_mut().find(|(id, _)| *id == category.id) {
                        Some((_, count)) => *count += 1,
                        None => tallies.push((category.id, 1)),
                    }
                }
            }

            for (category_id, count) in tallies {
                if seen.contains(&category_id) {
                    continue;
                }
                let Some(category) = doc.category(category_id) else {
                    continue;
                };
                let share = count as f64 / total as f64;
                let confidence = (share * 0.8 + 0.3).min(0.8);
                suggestions.push(CategorySuggestion {
                    category_id,
                    category_name: category.name.clone(),
                    category_path: doc
                        .account_path(category_id)
                        .unwrap_or_else(|| category.name.clone()),
                    confidence,
                    reason: format!("used in {} of {} recent matching transactions", count, total),
                    match_count: count,
                });
            }

            suggestions.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| b.match_count.cmp(&a.match_count))
                    .then_with(|| a.category_name.cmp(&b.category_name))
            });

            suggestions
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::models::{AccountKind, Money, TemplateLineItem};
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
        office: AccountId,
        shipping: AccountId,
    }

    fn setup(store: &LedgerStore) -> Fixture {
        store
            .write(|txn| {
                let checking = txn.create_account("Checking", AccountKind::Checking, None);
                let office = txn.create_account("Office Supplies", AccountKind::Expense, None);
                let shipping = txn.create_account("Shipping", AccountKind::Expense, None);
                Ok(Fixture {
                    checking: checking.id,
                    office: office.id,
                    shipping: shipping.id,
                })
            })
            .unwrap()
    }

    fn seed_rule(store: &LedgerStore, pattern: &str, category: AccountId) {
        store
            .write(|txn| {
                let template = txn.create_template("Office supply run");
                txn.update_template(template.id, |t| {
                    t.line_items.push(TemplateLineItem {
                        account_id: Some(category),
                        amount: Money::from_cents(-4500),
                        memo: String::new(),
                    });
                })?;
                txn.create_rule(pattern, template.id);
                Ok(())
            })
            .unwrap();
    }

    fn seed_categorized(
        store: &LedgerStore,
        fx: &Fixture,
        payee: &str,
        category: AccountId,
        day: u32,
    ) {
        store
            .write(|txn| {
                let t = txn.create_transaction(date(2025, 1, day), payee);
                txn.create_line_item(t.id, Some(fx.checking), Money::from_cents(-1000));
                txn.create_line_item(t.id, Some(category), Money::from_cents(1000));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_rule_and_history_merge() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        seed_rule(&store, "Acme.*", fx.office);

        // 10 historical matches: 7 office, 3 shipping
        for day in 1..=7 {
            seed_categorized(&store, &fx, "Acme Corp", fx.office, day);
        }
        for day in 8..=10 {
            seed_categorized(&store, &fx, "Acme Corp", fx.shipping, day);
        }

        let suggestions = SuggestionService::new(&store, 50)
            .suggest("Acme Corp")
            .unwrap();
        assert_eq!(suggestions.len(), 2);

        // The rule wins and is not duplicated by history
        assert_eq!(suggestions[0].category_name, "Office Supplies");
        assert_eq!(suggestions[0].confidence, 0.9);
        assert_eq!(suggestions[0].match_count, 0);
        assert!(suggestions[0].reason.contains("Acme.*"));

        // min(0.8, (3/10)*0.8 + 0.3) = 0.54
        assert_eq!(suggestions[1].category_name, "Shipping");
        assert!((suggestions[1].confidence - 0.54).abs() < 1e-9);
        assert_eq!(suggestions[1].match_count, 3);
        assert!(suggestions[1].reason.contains("3 of 10"));
    }

    #[test]
    fn test_history_confidence_is_capped() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);

        // Every match uses the same category: (10/10)*0.8 + 0.3 caps at 0.8
        for day in 1..=10 {
            seed_categorized(&store, &fx, "Corner Store", fx.office, day);
        }

        let suggestions = SuggestionService::new(&store, 50)
            .suggest("Corner Store")
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!((suggestions[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_sample_size_bounds_history() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);

        // Older office matches fall outside a sample of 3
        for day in 1..=5 {
            seed_categorized(&store, &fx, "Corner Store", fx.office, day);
        }
        for day in 6..=8 {
            seed_categorized(&store, &fx, "Corner Store", fx.shipping, day);
        }

        let suggestions = SuggestionService::new(&store, 3)
            .suggest("Corner Store")
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category_name, "Shipping");
        assert_eq!(suggestions[0].match_count, 3);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        seed_categorized(&store, &fx, "ACME CORP", fx.office, 1);

        let suggestions = SuggestionService::new(&store, 50)
            .suggest("acme corp")
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category_name, "Office Supplies");
    }

    #[test]
    fn test_malformed_rule_pattern_is_skipped() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);
        seed_rule(&store, "Acme(", fx.office);
        seed_categorized(&store, &fx, "Acme Corp", fx.shipping, 1);

        // The broken rule is silently skipped; history still answers
        let suggestions = SuggestionService::new(&store, 50)
            .suggest("Acme Corp")
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category_name, "Shipping");
    }

    #[test]
    fn test_no_matches() {
        let (_temp_dir, store) = open_test_store();
        setup(&store);

        let suggestions = SuggestionService::new(&store, 50)
            .suggest("Nowhere")
            .unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_hierarchical_path_in_suggestion() {
        let (_temp_dir, store) = open_test_store();
        let fx = setup(&store);

        let electric = store
            .write(|txn| {
                let utilities = txn.create_account("Utilities", AccountKind::Expense, None);
                Ok(txn
                    .create_account("Electric", AccountKind::Expense, Some(utilities.id))
                    .id)
            })
            .unwrap();
        seed_categorized(&store, &fx, "Power Co", electric, 1);

        let suggestions = SuggestionService::new(&store, 50).suggest("Power Co").unwrap();
        assert_eq!(suggestions[0].category_path, "Utilities:Electric");
    }
}
