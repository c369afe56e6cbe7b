//! Statement display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::services::StatementSummary;

#[derive(Tabled)]
struct StatementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Beginning")]
    beginning: String,
    #[tabled(rename = "Ending")]
    ending: String,
    #[tabled(rename = "Reconciled")]
    reconciled: String,
    #[tabled(rename = "Difference")]
    difference: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format statement summaries as a table
pub fn format_statement_list(summaries: &[StatementSummary]) -> String {
    if summaries.is_empty() {
        return "No statements found.".to_string();
    }

    let rows: Vec<StatementRow> = summaries
        .iter()
        .map(|summary| StatementRow {
            id: summary.statement.id.to_string(),
            period: format!(
                "{} .. {}",
                summary.statement.start_date, summary.statement.end_date
            ),
            beginning: summary.statement.beginning_balance.to_string(),
            ending: summary.statement.ending_balance.to_string(),
            reconciled: summary.reconciled_balance.to_string(),
            difference: summary.difference.to_string(),
            status: summary.status.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

/// Format one statement's derived state as a detail block
pub fn format_statement_details(summary: &StatementSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("Statement:   {}\n", summary.statement.id));
    output.push_str(&format!(
        "Period:      {} .. {}\n",
        summary.statement.start_date, summary.statement.end_date
    ));
    output.push_str(&format!(
        "Balances:    {} -> {}\n",
        summary.statement.beginning_balance, summary.statement.ending_balance
    ));
    output.push_str(&format!("Expected:    {}\n", summary.expected_change));
    output.push_str(&format!(
        "Reconciled:  {} across {} line items\n",
        summary.reconciled_balance, summary.line_item_count
    ));
    output.push_str(&format!("Difference:  {}\n", summary.difference));
    output.push_str(&format!("Status:      {}\n", summary.status));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, Money, Statement, StatementId, StatementStatus};
    use chrono::NaiveDate;

    fn summary() -> StatementSummary {
        let statement = Statement::new(
            StatementId::from_raw(1),
            AccountId::from_raw(1),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            Money::from_cents(100_000),
            Money::from_cents(95_000),
        );
        StatementSummary {
            expected_change: statement.expected_change(),
            statement,
            reconciled_balance: Money::from_cents(-5000),
            difference: Money::zero(),
            balanced: true,
            status: StatementStatus::Balanced,
            line_item_count: 3,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_statement_list(&[]), "No statements found.");
    }

    #[test]
    fn test_list_contains_status() {
        let table = format_statement_list(&[summary()]);
        assert!(table.contains("stmt-1"));
        assert!(table.contains("Balanced"));
    }

    #[test]
    fn test_details() {
        let details = format_statement_details(&summary());
        assert!(details.contains("2025-02-01 .. 2025-02-28"));
        assert!(details.contains("3 line items"));
    }
}
