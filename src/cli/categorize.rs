//! Categorization CLI commands

use clap::Subcommand;

use crate::error::{TallyError, TallyResult};
use crate::services::CategorizeService;
use crate::storage::LedgerStore;

use super::resolve_category;

/// Categorization subcommands
#[derive(Subcommand)]
pub enum CategorizeCommands {
    /// Assign a transaction to a category
    Set {
        /// Transaction ID
        transaction: String,
        /// Category name or ID
        category: String,
    },
    /// Recategorize every transaction whose payee matches a pattern
    Bulk {
        /// Case-insensitive payee substring
        pattern: String,
        /// Category name or ID
        category: String,
        /// Preview the changes without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Only touch transactions that have no category yet
        #[arg(long)]
        uncategorized_only: bool,
    },
}

/// Handle a categorize command
pub fn handle_categorize_command(store: &LedgerStore, cmd: CategorizeCommands) -> TallyResult<()> {
    let service = CategorizeService::new(store);

    match cmd {
        CategorizeCommands::Set {
            transaction,
            category,
        } => {
            let transaction_id = transaction.parse().map_err(|_| {
                TallyError::Validation(format!("Invalid transaction ID: {}", transaction))
            })?;
            let category = resolve_category(store, &category)?;

            let outcome = service.recategorize(transaction_id, category.id)?;
            match outcome.old_category {
                Some(old) => println!(
                    "{} '{}': {} -> {}",
                    outcome.transaction_id, outcome.payee, old, outcome.new_category
                ),
                None => println!(
                    "{} '{}': categorized as {}",
                    outcome.transaction_id, outcome.payee, outcome.new_category
                ),
            }
        }

        CategorizeCommands::Bulk {
            pattern,
            category,
            dry_run,
            uncategorized_only,
        } => {
            let category = resolve_category(store, &category)?;
            let outcome =
                service.bulk_recategorize(&pattern, category.id, dry_run, uncategorized_only)?;

            if outcome.dry_run {
                println!(
                    "Dry run: {} transactions matching '{}' would move to {}",
                    outcome.count, pattern, category.name
                );
            } else {
                println!(
                    "Moved {} transactions matching '{}' to {}",
                    outcome.count, pattern, category.name
                );
            }

            for affected in &outcome.affected {
                let old = affected.old_category.as_deref().unwrap_or("(uncategorized)");
                println!(
                    "  {} {:24} {} -> {}",
                    affected.transaction_id, affected.payee, old, affected.new_category
                );
            }
        }
    }

    Ok(())
}
