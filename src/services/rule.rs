//! Import rule service
//!
//! Thin CRUD over import rules and their templates. Rules feed the
//! suggestion engine; they never touch ledger invariants themselves.

use regex::RegexBuilder;

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::{AccountId, ImportRule, Money, Template, TemplateLineItem};
use crate::storage::LedgerStore;

/// Service for import rule management
pub struct RuleService<'a> {
    store: &'a LedgerStore,
}

impl<'a> RuleService<'a> {
    /// Create a new rule service
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Create an import rule with a single-category template
    ///
    /// The pattern must be a valid regular expression; the category must
    /// exist. A template named after the category carries one category leg.
    pub fn create(
        &self,
        pattern: &str,
        category_id: AccountId,
        amount: Option<Money>,
    ) -> TallyResult<ImportRule> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| TallyError::Validation(format!("invalid rule pattern: {}", e)))?;

        self.store.write(|txn| {
            let category = txn
                .doc()
                .category(category_id)
                .cloned()
                .ok_or_else(|| TallyError::category_not_found(category_id.to_string()))?;

            let template = txn.create_template(category.name.clone());
            let template = txn.update_template(template.id, |t| {
                t.line_items.push(TemplateLineItem {
                    account_id: Some(category_id),
                    amount: amount.unwrap_or_else(Money::zero),
                    memo: String::new(),
                });
            })?;
            txn.log_create(
                EntityType::Template,
                template.id.to_string(),
                Some(template.name.clone()),
                &template,
            );

            let rule = txn.create_rule(pattern, template.id);
            txn.log_create(
                EntityType::ImportRule,
                rule.id.to_string(),
                Some(rule.pattern.clone()),
                &rule,
            );

            Ok(rule)
        })
    }

    /// List all rules with their templates
    pub fn list(&self) -> TallyResult<Vec<(ImportRule, Option<Template>)>> {
        self.store.read(|doc| {
            doc.rules
                .iter()
                .map(|rule| (rule.clone(), doc.template(rule.template_id).cloned()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::models::AccountKind;
    use tempfile::TempDir;

    fn open_test_store() -> (TempDir, LedgerStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = LedgerStore::open(paths).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_create_rule_with_template() {
        let (_temp_dir, store) = open_test_store();
        let category = store
            .write(|txn| Ok(txn.create_account("Office Supplies", AccountKind::Expense, None).id))
            .unwrap();

        let rule = RuleService::new(&store)
            .create("Acme.*", category, None)
            .unwrap();
        assert_eq!(rule.pattern, "Acme.*");

        let rules = RuleService::new(&store).list().unwrap();
        assert_eq!(rules.len(), 1);
        let template = rules[0].1.as_ref().unwrap();
        assert_eq!(template.line_items.len(), 1);
        assert_eq!(template.line_items[0].account_id, Some(category));
    }

    #[test]
    fn test_create_rejects_invalid_pattern() {
        let (_temp_dir, store) = open_test_store();
        let category = store
            .write(|txn| Ok(txn.create_account("Office Supplies", AccountKind::Expense, None).id))
            .unwrap();

        let err = RuleService::new(&store)
            .create("Acme(", category, None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_rejects_unknown_category() {
        let (_temp_dir, store) = open_test_store();

        let err = RuleService::new(&store)
            .create("Acme.*", AccountId::from_raw(999), None)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
