//! CSV export functionality
//!
//! Exports an account register (line items with running balances) to CSV.

use std::io::Write;

use crate::error::{TallyError, TallyResult};
use crate::models::AccountId;
use crate::services::TransactionService;
use crate::storage::LedgerStore;

/// Export an account's register to CSV
///
/// Columns: line item id, date, payee, memo, amount, running balance,
/// cleared flag, and the statement the item is reconciled against (if any).
/// Amounts are emitted in dollars with two decimal places.
pub fn export_register_csv<W: Write>(
    store: &LedgerStore,
    account_id: AccountId,
    writer: W,
) -> TallyResult<usize> {
    let entries = TransactionService::new(store).register(account_id)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record([
            "Item",
            "Date",
            "Payee",
            "Memo",
            "Amount",
            "Running Balance",
            "Cleared",
            "Statement",
        ])
        .map_err(|e| TallyError::Io(format!("Failed to write CSV header: {}", e)))?;

    for entry in &entries {
        let balance = entry
            .line_item
            .running_balance
            .map(|b| format!("{:.2}", b.cents() as f64 / 100.0))
            .unwrap_or_default();
        let statement = entry
            .line_item
            .statement_id
            .map(|id| id.to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([
                entry.line_item.id.to_string(),
                entry.transaction.date.to_string(),
                entry.transaction.payee.clone(),
                entry.line_item.memo.clone(),
                format!("{:.2}", entry.line_item.amount.cents() as f64 / 100.0),
                balance,
                entry.line_item.cleared.to_string(),
                statement,
            ])
            .map_err(|e| TallyError::Io(format!("Failed to write CSV row: {}", e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| TallyError::Io(format!("Failed to flush CSV: {}", e)))?;

    Ok(entries.len())
}
