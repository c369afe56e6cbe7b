use anyhow::Result;
use clap::{Parser, Subcommand};

use tally::cli::{
    handle_account_command, handle_categorize_command, handle_export_command, handle_rule_command,
    handle_statement_command, handle_transaction_command, AccountCommands, CategorizeCommands,
    ExportCommands, RuleCommands, StatementCommands, TransactionCommands,
};
use tally::config::{paths::TallyPaths, settings::Settings};
use tally::services::{AccountService, BalanceService, SuggestionService};
use tally::storage::LedgerStore;

#[derive(Parser)]
#[command(
    name = "tally",
    author = "Kaylee Beyene",
    version,
    about = "Double-entry personal ledger for the terminal",
    long_about = "Tally keeps a double-entry personal ledger: accounts, categorized \
                  transactions, bank statement reconciliation, and category \
                  suggestions learned from rules and history."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand, alias = "acct")]
    Account(AccountCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Category assignment commands
    #[command(subcommand, alias = "cat")]
    Categorize(CategorizeCommands),

    /// Statement reconciliation commands
    #[command(subcommand, alias = "stmt")]
    Statement(StatementCommands),

    /// Import rule commands
    #[command(subcommand)]
    Rule(RuleCommands),

    /// Suggest categories for a merchant name
    Suggest {
        /// Merchant or payee name
        merchant: String,
    },

    /// Recompute an account's running balances
    Balance {
        /// Account name or ID
        account: String,
    },

    /// Export commands
    #[command(subcommand)]
    Export(ExportCommands),

    /// Initialize the ledger data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = TallyPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Open the ledger store
    let store = LedgerStore::open(paths.clone())?;

    match cli.command {
        Commands::Account(cmd) => {
            handle_account_command(&store, &settings, cmd)?;
        }
        Commands::Transaction(cmd) => {
            handle_transaction_command(&store, cmd)?;
        }
        Commands::Categorize(cmd) => {
            handle_categorize_command(&store, cmd)?;
        }
        Commands::Statement(cmd) => {
            handle_statement_command(&store, cmd)?;
        }
        Commands::Rule(cmd) => {
            handle_rule_command(&store, cmd)?;
        }
        Commands::Suggest { merchant } => {
            let suggestions =
                SuggestionService::new(&store, settings.suggestion_sample_size)
                    .suggest(&merchant)?;
            if suggestions.is_empty() {
                println!("No suggestions for '{}'", merchant);
            }
            for suggestion in suggestions {
                println!(
                    "{:.2}  {:24} {}",
                    suggestion.confidence, suggestion.category_path, suggestion.reason
                );
            }
        }
        Commands::Balance { account } => {
            let resolved = AccountService::new(&store)
                .find(&account)?
                .ok_or_else(|| tally::TallyError::account_not_found(account.clone()))?;
            let updated = BalanceService::new(&store).recalculate(resolved.id)?;
            println!(
                "Recalculated {} line item balances for {}",
                updated, resolved.name
            );
        }
        Commands::Export(cmd) => {
            handle_export_command(&store, cmd)?;
        }
        Commands::Init => {
            if paths.is_initialized() {
                println!("Already initialized at {}", paths.base_dir().display());
            } else {
                settings.save(&paths)?;
                println!("Initialized ledger at {}", paths.base_dir().display());
            }
        }
        Commands::Config => {
            println!("Base directory: {}", paths.base_dir().display());
            println!("Ledger file:    {}", paths.ledger_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!("Currency:       {}", settings.currency_symbol);
            println!("Sample size:    {}", settings.suggestion_sample_size);
        }
    }

    Ok(())
}
