//! Import rule CLI commands

use clap::Subcommand;

use crate::error::TallyResult;
use crate::services::RuleService;
use crate::storage::LedgerStore;

use super::{parse_money, resolve_category};

/// Import rule subcommands
#[derive(Subcommand)]
pub enum RuleCommands {
    /// Add a rule mapping a payee pattern to a category
    Add {
        /// Regular expression matched against payee names
        pattern: String,
        /// Category name or ID
        category: String,
        /// Template amount (optional)
        #[arg(short, long)]
        amount: Option<String>,
    },
    /// List import rules
    List,
}

/// Handle a rule command
pub fn handle_rule_command(store: &LedgerStore, cmd: RuleCommands) -> TallyResult<()> {
    let service = RuleService::new(store);

    match cmd {
        RuleCommands::Add {
            pattern,
            category,
            amount,
        } => {
            let category = resolve_category(store, &category)?;
            let amount = amount.map(|a| parse_money(&a)).transpose()?;
            let rule = service.create(&pattern, category.id, amount)?;
            println!("Created {}: /{}/ -> {}", rule.id, rule.pattern, category.name);
        }

        RuleCommands::List => {
            for (rule, template) in service.list()? {
                let target = template
                    .map(|t| t.name)
                    .unwrap_or_else(|| "(missing template)".to_string());
                println!("{} /{}/ -> {}", rule.id, rule.pattern, target);
            }
        }
    }

    Ok(())
}
