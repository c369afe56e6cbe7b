//! Account register formatting
//!
//! Renders the per-account line item register with running balances and
//! reconciliation markers.

use crate::services::RegisterEntry;

/// Format a single register row
pub fn format_register_row(entry: &RegisterEntry) -> String {
    let cleared_icon = if entry.line_item.cleared { "✓" } else { " " };
    let statement = entry
        .line_item
        .statement_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    let balance = entry
        .line_item
        .running_balance
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {:10} {:24} {:>12} {:>12} {}",
        cleared_icon,
        entry.line_item.id,
        entry.transaction.date.format("%Y-%m-%d"),
        truncate(&entry.transaction.payee, 24),
        entry.line_item.amount.to_string(),
        balance,
        statement
    )
}

/// Format a register as a column-aligned listing
pub fn format_register(entries: &[RegisterEntry]) -> String {
    if entries.is_empty() {
        return "No line items found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "  {:9}{:10} {:24} {:>12} {:>12} {}\n",
        "Item", "Date", "Payee", "Amount", "Balance", "Statement"
    ));
    output.push_str(&"-".repeat(78));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_register_row(entry));
        output.push('\n');
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
