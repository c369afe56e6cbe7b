//! Transaction CLI commands

use clap::Subcommand;

use crate::error::{TallyError, TallyResult};
use crate::services::{CreateTransactionInput, TransactionFilter, TransactionService};
use crate::storage::LedgerStore;

use super::{parse_date_or_today, parse_money, resolve_account, resolve_category};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Account name or ID
        account: String,
        /// Amount (negative for outflow, e.g., "-45.20")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Payee name
        #[arg(short, long)]
        payee: Option<String>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Memo
        #[arg(short, long)]
        memo: Option<String>,
    },
    /// List transactions
    List {
        /// Filter by account
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by payee substring
        #[arg(short, long)]
        payee: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show an account register with running balances
    Register {
        /// Account name or ID
        account: String,
    },
    /// Show a transaction's line items
    Show {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(store: &LedgerStore, cmd: TransactionCommands) -> TallyResult<()> {
    let service = TransactionService::new(store);

    match cmd {
        TransactionCommands::Add {
            account,
            amount,
            payee,
            category,
            date,
            memo,
        } => {
            let account = resolve_account(store, &account)?;
            let amount = parse_money(&amount)?;
            let date = parse_date_or_today(date.as_deref())?;
            let category_id = category
                .map(|c| resolve_category(store, &c).map(|c| c.id))
                .transpose()?;

            let transaction = service.create(CreateTransactionInput {
                account_id: account.id,
                date,
                amount,
                payee: payee.unwrap_or_default(),
                category_id,
                memo,
            })?;

            println!("Added {} {} {}", transaction.id, transaction, amount);
        }

        TransactionCommands::List {
            account,
            payee,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(account) = account {
                filter = filter.account(resolve_account(store, &account)?.id);
            }
            if let Some(payee) = payee {
                filter = filter.payee(payee);
            }

            for transaction in service.list(filter)? {
                println!("{} {}", transaction.id, transaction);
            }
        }

        TransactionCommands::Register { account } => {
            let account = resolve_account(store, &account)?;
            let register = service.register(account.id)?;
            println!("Register: {}", account.name);
            print!("{}", crate::display::format_register(&register));
        }

        TransactionCommands::Show { id } => {
            let id = id
                .parse()
                .map_err(|_| TallyError::Validation(format!("Invalid transaction ID: {}", id)))?;
            let transaction = service
                .get(id)?
                .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;

            println!("{} {}", transaction.id, transaction);
            if !transaction.memo.is_empty() {
                println!("Memo: {}", transaction.memo);
            }
            for item in service.line_items(id)? {
                let account_name = item
                    .account_id
                    .and_then(|account_id| {
                        store
                            .read(|doc| doc.account_path(account_id))
                            .ok()
                            .flatten()
                    })
                    .unwrap_or_else(|| "(orphaned)".to_string());
                println!("  {} {:>12}  {}", item.id, item.amount.to_string(), account_name);
            }
        }
    }

    Ok(())
}
