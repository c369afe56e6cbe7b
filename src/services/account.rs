//! Account service
//!
//! Creation and lookup of accounts and categories. An account's
//! classification is fixed here at creation and no operation mutates it.

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::{Account, AccountId, AccountKind};
use crate::storage::LedgerStore;

/// Service for account management
pub struct AccountService<'a> {
    store: &'a LedgerStore,
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Create a new account or category
    ///
    /// A parent may only be given for category accounts and must itself be a
    /// category. Parents are assigned only at creation, so the category tree
    /// cannot acquire cycles.
    pub fn create(
        &self,
        name: &str,
        kind: AccountKind,
        parent: Option<AccountId>,
    ) -> TallyResult<Account> {
        self.store.write(|txn| {
            if let Some(parent_id) = parent {
                if !kind.is_category() {
                    return Err(TallyError::Validation(
                        "Only category accounts may have a parent category".into(),
                    ));
                }
                txn.doc()
                    .category(parent_id)
                    .ok_or_else(|| TallyError::category_not_found(parent_id.to_string()))?;
            }

            let account = txn.create_account(name.trim(), kind, parent);
            account
                .validate()
                .map_err(|e| TallyError::Validation(e.to_string()))?;

            txn.log_create(
                EntityType::Account,
                account.id.to_string(),
                Some(account.name.clone()),
                &account,
            );

            Ok(account)
        })
    }

    /// Get an account by ID
    pub fn get(&self, id: AccountId) -> TallyResult<Option<Account>> {
        self.store.read(|doc| doc.account(id).cloned())
    }

    /// Find an account by ID string or case-insensitive name
    pub fn find(&self, identifier: &str) -> TallyResult<Option<Account>> {
        self.store.read(|doc| {
            if let Ok(id) = identifier.parse::<AccountId>() {
                if let Some(account) = doc.account(id) {
                    return Some(account.clone());
                }
            }
            doc.account_by_name(identifier).cloned()
        })
    }

    /// List all accounts, real accounts before categories
    pub fn list(&self) -> TallyResult<Vec<Account>> {
        self.store.read(|doc| {
            let mut accounts = doc.accounts.clone();
            accounts.sort_by(|a, b| {
                a.is_category()
                    .cmp(&b.is_category())
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            });
            accounts
        })
    }

    /// Full hierarchical path name of an account
    pub fn path(&self, id: AccountId) -> TallyResult<String> {
        self.store
            .read(|doc| doc.account_path(id))?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))
    }
}
