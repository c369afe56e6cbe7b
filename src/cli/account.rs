//! Account CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::error::{TallyError, TallyResult};
use crate::models::AccountKind;
use crate::services::AccountService;
use crate::storage::LedgerStore;

use super::resolve_category;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Add a new account or category
    Add {
        /// Account name
        name: String,
        /// Account kind (checking, savings, credit, cash, investment, income, expense)
        #[arg(short, long)]
        kind: Option<String>,
        /// Parent category name or ID (categories only)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// List accounts and categories
    List,
}

/// Handle an account command
pub fn handle_account_command(
    store: &LedgerStore,
    settings: &Settings,
    cmd: AccountCommands,
) -> TallyResult<()> {
    let service = AccountService::new(store);

    match cmd {
        AccountCommands::Add { name, kind, parent } => {
            let kind = match kind {
                Some(kind) => AccountKind::parse(&kind).ok_or_else(|| {
                    TallyError::Validation(format!("Unknown account kind: '{}'", kind))
                })?,
                None => settings.default_account_kind,
            };

            let parent_id = parent
                .map(|p| resolve_category(store, &p).map(|c| c.id))
                .transpose()?;

            let account = service.create(&name, kind, parent_id)?;
            println!("Created {} as {}", account, account.id);
        }

        AccountCommands::List => {
            let accounts = service.list()?;
            let with_paths: Vec<_> = accounts
                .into_iter()
                .map(|account| {
                    let path = service
                        .path(account.id)
                        .unwrap_or_else(|_| account.name.clone());
                    (account, path)
                })
                .collect();
            println!("{}", crate::display::format_account_list(&with_paths));
        }
    }

    Ok(())
}
