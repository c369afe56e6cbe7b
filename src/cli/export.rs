//! Export CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::error::{TallyError, TallyResult};
use crate::export::export_register_csv;
use crate::storage::LedgerStore;

use super::resolve_account;

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export an account register to CSV
    Register {
        /// Account name or ID
        account: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an export command
pub fn handle_export_command(store: &LedgerStore, cmd: ExportCommands) -> TallyResult<()> {
    match cmd {
        ExportCommands::Register { account, output } => {
            let account = resolve_account(store, &account)?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path).map_err(|e| {
                        TallyError::Io(format!("Failed to create {}: {}", path.display(), e))
                    })?;
                    let rows = export_register_csv(store, account.id, file)?;
                    eprintln!("Exported {} rows to {}", rows, path.display());
                }
                None => {
                    export_register_csv(store, account.id, std::io::stdout().lock())?;
                }
            }
        }
    }

    Ok(())
}
