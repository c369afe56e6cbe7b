//! Statement reconciliation CLI commands

use clap::Subcommand;

use crate::error::{TallyError, TallyResult};
use crate::models::LineItemId;
use crate::services::{CreateStatementInput, StatementService};
use crate::storage::LedgerStore;

use super::{parse_date, parse_money, resolve_account};

/// Statement subcommands
#[derive(Subcommand)]
pub enum StatementCommands {
    /// Create a statement for an account
    Create {
        /// Account name or ID
        account: String,
        /// First day covered (YYYY-MM-DD)
        start: String,
        /// Last day covered (YYYY-MM-DD)
        end: String,
        /// Balance at the start of the period (e.g., "1000.00")
        #[arg(allow_hyphen_values = true)]
        beginning: String,
        /// Balance at the end of the period (e.g., "1200.00")
        #[arg(allow_hyphen_values = true)]
        ending: String,
    },
    /// List an account's statements
    List {
        /// Account name or ID
        account: String,
    },
    /// Show a statement's reconciliation state
    Show {
        /// Statement ID
        id: String,
    },
    /// Reconcile line items against a statement
    Reconcile {
        /// Statement ID
        id: String,
        /// Line item IDs
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Release line items from a statement
    Unreconcile {
        /// Statement ID
        id: String,
        /// Line item IDs
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Delete a statement, unreconciling its line items
    Delete {
        /// Statement ID
        id: String,
    },
}

fn parse_statement_id(id: &str) -> TallyResult<crate::models::StatementId> {
    id.parse()
        .map_err(|_| TallyError::Validation(format!("Invalid statement ID: {}", id)))
}

fn parse_line_item_ids(items: &[String]) -> TallyResult<Vec<LineItemId>> {
    items
        .iter()
        .map(|item| {
            item.parse()
                .map_err(|_| TallyError::Validation(format!("Invalid line item ID: {}", item)))
        })
        .collect()
}

/// Handle a statement command
pub fn handle_statement_command(store: &LedgerStore, cmd: StatementCommands) -> TallyResult<()> {
    let service = StatementService::new(store);

    match cmd {
        StatementCommands::Create {
            account,
            start,
            end,
            beginning,
            ending,
        } => {
            let account = resolve_account(store, &account)?;
            let statement = service.create(CreateStatementInput {
                account_id: account.id,
                start_date: parse_date(&start)?,
                end_date: parse_date(&end)?,
                beginning_balance: parse_money(&beginning)?,
                ending_balance: parse_money(&ending)?,
            })?;
            println!("Created {} for {}: {}", statement.id, account.name, statement);
        }

        StatementCommands::List { account } => {
            let account = resolve_account(store, &account)?;
            let summaries = service.list_for_account(account.id)?;
            println!("Statements: {}", account.name);
            println!("{}", crate::display::format_statement_list(&summaries));
        }

        StatementCommands::Show { id } => {
            let summary = service.summary(parse_statement_id(&id)?)?;
            print!("{}", crate::display::format_statement_details(&summary));
        }

        StatementCommands::Reconcile { id, items } => {
            let statement_id = parse_statement_id(&id)?;
            let ids = parse_line_item_ids(&items)?;
            let assigned = service.reconcile_line_items(statement_id, &ids)?;

            let summary = service.summary(statement_id)?;
            println!("Reconciled {} line items against {}", assigned, statement_id);
            println!("Difference: {} ({})", summary.difference, summary.status);
        }

        StatementCommands::Unreconcile { id, items } => {
            let statement_id = parse_statement_id(&id)?;
            let ids = parse_line_item_ids(&items)?;
            let released = service.unreconcile_line_items(statement_id, &ids)?;
            println!("Released {} line items from {}", released, statement_id);
        }

        StatementCommands::Delete { id } => {
            let statement_id = parse_statement_id(&id)?;
            if service.delete(statement_id)? {
                println!("Deleted {}; its line items were unreconciled", statement_id);
            } else {
                println!("{} does not exist", statement_id);
            }
        }
    }

    Ok(())
}
