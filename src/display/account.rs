//! Account display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Account;

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Format a list of accounts with their hierarchical paths as a table
pub fn format_account_list(accounts: &[(Account, String)]) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    let rows: Vec<AccountRow> = accounts
        .iter()
        .map(|(account, path)| AccountRow {
            id: account.id.to_string(),
            name: account.name.clone(),
            kind: account.kind.to_string(),
            path: path.clone(),
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}
