//! Storage layer for Tally
//!
//! The ledger is one JSON document (`ledger.json`) holding typed records for
//! every entity kind plus the id counters that assign integer keys. All
//! mutations go through [`LedgerStore::write`], which stages changes on a
//! cloned document and commits atomically: either every record change of one
//! logical operation becomes visible, or none do. Reads see only committed
//! state.
//!
//! Balance-recalculation runs as its own write call, deliberately decoupled
//! from the mutation that made it necessary; the running-balance cache is
//! re-derivable, so a crash between the two commits leaves it stale but
//! repairable.

pub mod file_io;
pub mod guard;

pub use guard::{LockInfo, WriteGuard};

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::TallyPaths;
use crate::error::{TallyError, TallyResult};
use crate::models::{
    Account, AccountId, AccountKind, ImportRule, LineItem, LineItemId, Money, RuleId, Statement,
    StatementId, Template, TemplateId, Transaction, TransactionId,
};

/// Monotonic key counters persisted with the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdCounters {
    #[serde(default)]
    pub account: i64,
    #[serde(default)]
    pub transaction: i64,
    #[serde(default)]
    pub line_item: i64,
    #[serde(default)]
    pub statement: i64,
    #[serde(default)]
    pub rule: i64,
    #[serde(default)]
    pub template: i64,
    #[serde(default)]
    pub sequence: i64,
}

/// The whole ledger as one serializable document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub rules: Vec<ImportRule>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub counters: IdCounters,
}

impl LedgerDocument {
    /// Look up an account by key
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Look up a category account by key
    ///
    /// Sees only income/expense accounts; a real account under the same key
    /// is not found, mirroring a subtype-scoped fetch.
    pub fn category(&self, id: AccountId) -> Option<&Account> {
        self.account(id).filter(|a| a.is_category())
    }

    /// Look up a transaction by key
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Look up a line item by key
    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.id == id)
    }

    /// Look up a statement by key
    pub fn statement(&self, id: StatementId) -> Option<&Statement> {
        self.statements.iter().find(|s| s.id == id)
    }

    /// Look up a template by key
    pub fn template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Find an account by case-insensitive name
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let needle = name.trim().to_lowercase();
        self.accounts
            .iter()
            .find(|a| a.name.to_lowercase() == needle)
    }

    /// The line items belonging to a transaction, in key order
    pub fn line_items_for_transaction(&self, id: TransactionId) -> Vec<&LineItem> {
        self.line_items
            .iter()
            .filter(|li| li.transaction_id == id)
            .collect()
    }

    /// The line items posting to an account, in key order
    pub fn line_items_for_account(&self, id: AccountId) -> Vec<&LineItem> {
        self.line_items
            .iter()
            .filter(|li| li.account_id == Some(id))
            .collect()
    }

    /// The line items reconciled against a statement
    pub fn line_items_for_statement(&self, id: StatementId) -> Vec<&LineItem> {
        self.line_items
            .iter()
            .filter(|li| li.statement_id == Some(id))
            .collect()
    }

    /// The statements for an account, in key order
    pub fn statements_for_account(&self, id: AccountId) -> Vec<&Statement> {
        self.statements
            .iter()
            .filter(|s| s.account_id == id)
            .collect()
    }

    /// Full hierarchical path name of an account ("Utilities:Electric")
    ///
    /// The walk is cycle-guarded: a corrupted parent loop terminates at the
    /// first repeated key instead of hanging.
    pub fn account_path(&self, id: AccountId) -> Option<String> {
        let mut segments = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut cursor = Some(id);

        while let Some(current) = cursor {
            if !seen.insert(current) {
                break;
            }
            let account = self.account(current)?;
            segments.push(account.name.clone());
            cursor = account.parent_id;
        }

        segments.reverse();
        Some(segments.join(":"))
    }
}

/// A staged, isolated write transaction over the ledger document
///
/// Services mutate through the `create_*`/`update_*`/`delete_*` methods and
/// queue audit entries; [`LedgerStore::write`] commits everything atomically
/// on success and discards everything on error.
pub struct WriteTxn<'a> {
    doc: &'a mut LedgerDocument,
    audit_entries: Vec<AuditEntry>,
}

impl<'a> WriteTxn<'a> {
    /// Read access to the staged document (reflects this transaction's own
    /// uncommitted changes)
    pub fn doc(&self) -> &LedgerDocument {
        self.doc
    }

    /// Create an account with a store-assigned key
    pub fn create_account(
        &mut self,
        name: impl Into<String>,
        kind: AccountKind,
        parent_id: Option<AccountId>,
    ) -> Account {
        self.doc.counters.account += 1;
        let mut account = Account::new(AccountId::from_raw(self.doc.counters.account), name, kind);
        account.parent_id = parent_id;
        self.doc.accounts.push(account.clone());
        account
    }

    /// Create a transaction with a store-assigned key and sequence
    pub fn create_transaction(
        &mut self,
        date: chrono::NaiveDate,
        payee: impl Into<String>,
    ) -> Transaction {
        self.doc.counters.transaction += 1;
        self.doc.counters.sequence += 1;
        let transaction = Transaction::new(
            TransactionId::from_raw(self.doc.counters.transaction),
            date,
            payee,
            self.doc.counters.sequence,
        );
        self.doc.transactions.push(transaction.clone());
        transaction
    }

    /// Create a line item with a store-assigned key
    pub fn create_line_item(
        &mut self,
        transaction_id: TransactionId,
        account_id: Option<AccountId>,
        amount: Money,
    ) -> LineItem {
        self.doc.counters.line_item += 1;
        let item = LineItem::new(
            LineItemId::from_raw(self.doc.counters.line_item),
            transaction_id,
            account_id,
            amount,
        );
        self.doc.line_items.push(item.clone());
        item
    }

    /// Create a statement with a store-assigned key
    pub fn create_statement(
        &mut self,
        account_id: AccountId,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        beginning_balance: Money,
        ending_balance: Money,
    ) -> Statement {
        self.doc.counters.statement += 1;
        let statement = Statement::new(
            StatementId::from_raw(self.doc.counters.statement),
            account_id,
            start_date,
            end_date,
            beginning_balance,
            ending_balance,
        );
        self.doc.statements.push(statement.clone());
        statement
    }

    /// Create an import rule with a store-assigned key
    pub fn create_rule(&mut self, pattern: impl Into<String>, template_id: TemplateId) -> ImportRule {
        self.doc.counters.rule += 1;
        let rule = ImportRule::new(RuleId::from_raw(self.doc.counters.rule), pattern, template_id);
        self.doc.rules.push(rule.clone());
        rule
    }

    /// Create a template with a store-assigned key
    pub fn create_template(&mut self, name: impl Into<String>) -> Template {
        self.doc.counters.template += 1;
        let template = Template::new(TemplateId::from_raw(self.doc.counters.template), name);
        self.doc.templates.push(template.clone());
        template
    }

    /// Update an account in place
    pub fn update_account(
        &mut self,
        id: AccountId,
        f: impl FnOnce(&mut Account),
    ) -> TallyResult<Account> {
        let account = self
            .doc
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;
        f(account);
        Ok(account.clone())
    }

    /// Update a transaction in place
    pub fn update_transaction(
        &mut self,
        id: TransactionId,
        f: impl FnOnce(&mut Transaction),
    ) -> TallyResult<Transaction> {
        let transaction = self
            .doc
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;
        f(transaction);
        Ok(transaction.clone())
    }

    /// Update a line item in place
    pub fn update_line_item(
        &mut self,
        id: LineItemId,
        f: impl FnOnce(&mut LineItem),
    ) -> TallyResult<LineItem> {
        let item = self
            .doc
            .line_items
            .iter_mut()
            .find(|li| li.id == id)
            .ok_or_else(|| TallyError::line_item_not_found(id.to_string()))?;
        f(item);
        Ok(item.clone())
    }

    /// Update a template in place
    pub fn update_template(
        &mut self,
        id: TemplateId,
        f: impl FnOnce(&mut Template),
    ) -> TallyResult<Template> {
        let template = self
            .doc
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TallyError::NotFound {
                entity_type: "Template",
                identifier: id.to_string(),
            })?;
        f(template);
        Ok(template.clone())
    }

    /// Delete a line item
    pub fn delete_line_item(&mut self, id: LineItemId) -> TallyResult<LineItem> {
        let index = self
            .doc
            .line_items
            .iter()
            .position(|li| li.id == id)
            .ok_or_else(|| TallyError::line_item_not_found(id.to_string()))?;
        Ok(self.doc.line_items.remove(index))
    }

    /// Delete a statement
    pub fn delete_statement(&mut self, id: StatementId) -> TallyResult<Statement> {
        let index = self
            .doc
            .statements
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| TallyError::statement_not_found(id.to_string()))?;
        Ok(self.doc.statements.remove(index))
    }

    /// Queue an audit entry for a create; written after the commit succeeds
    pub fn log_create<T: Serialize>(
        &mut self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        self.audit_entries
            .push(AuditEntry::create(entity_type, entity_id, entity_name, entity));
    }

    /// Queue an audit entry for an update
    ///
    /// When no summary is given, one is derived from the before/after JSON.
    pub fn log_update<T: Serialize>(
        &mut self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) {
        let diff_summary = diff_summary.or_else(|| {
            let before = serde_json::to_value(before).ok()?;
            let after = serde_json::to_value(after).ok()?;
            crate::audit::generate_diff(&before, &after)
        });
        self.audit_entries.push(AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ));
    }

    /// Queue an audit entry for a delete
    pub fn log_delete<T: Serialize>(
        &mut self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        self.audit_entries
            .push(AuditEntry::delete(entity_type, entity_id, entity_name, entity));
    }
}

/// The ledger entity store
///
/// Owns the in-memory document, the on-disk file, the write-access guard,
/// and the audit log.
pub struct LedgerStore {
    paths: TallyPaths,
    data: RwLock<LedgerDocument>,
    audit: AuditLogger,
    guard: WriteGuard,
}

impl LedgerStore {
    /// Open (or create) the ledger at the given paths
    pub fn open(paths: TallyPaths) -> TallyResult<Self> {
        paths.ensure_directories()?;
        let document: LedgerDocument = file_io::read_json(paths.ledger_file())?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            guard: WriteGuard::new(paths.lock_file()),
            data: RwLock::new(document),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    /// Access the audit log
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Access the write guard (external tools mark themselves through it)
    pub fn guard(&self) -> &WriteGuard {
        &self.guard
    }

    /// Run a read-only closure against the committed document
    pub fn read<R>(&self, f: impl FnOnce(&LedgerDocument) -> R) -> TallyResult<R> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(f(&data))
    }

    /// Run a mutating closure inside an isolated write transaction
    ///
    /// The write-access guard is consulted first; a blocked ledger aborts
    /// before any record is touched. The closure mutates a staged copy of the
    /// document. On success the copy is persisted atomically, swapped in as
    /// the committed state, and the queued audit entries are appended. On
    /// error nothing becomes visible.
    pub fn write<R>(&self, f: impl FnOnce(&mut WriteTxn) -> TallyResult<R>) -> TallyResult<R> {
        if let Some(reason) = self.guard.check()? {
            return Err(TallyError::WriteBlocked(reason));
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let mut staged = data.clone();
        let mut txn = WriteTxn {
            doc: &mut staged,
            audit_entries: Vec::new(),
        };

        let result = f(&mut txn)?;
        let audit_entries = txn.audit_entries;

        file_io::write_json_atomic(self.paths.ledger_file(), &staged)?;
        *data = staged;

        self.audit.log_batch(&audit_entries)?;

        Ok(result)
    }
}
