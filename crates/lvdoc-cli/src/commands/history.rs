//! History command - list or clear recently submitted inputs.

use chrono::Local;
use clap::{Args, Subcommand};
use console::style;

use super::{history_dir, load_config, open_history};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List recent inputs, most recent first
    Show {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove all entries
    Clear,
}

pub fn run(args: HistoryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    if !config.history.enabled {
        println!("{} History is disabled in the configuration.", style("ℹ").blue());
        return Ok(());
    }

    let mut history = open_history(&config);

    match args.command {
        HistoryCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(history.entries())?);
                return Ok(());
            }

            if history.entries().is_empty() {
                println!("No documents analyzed yet.");
                return Ok(());
            }

            for (i, entry) in history.entries().iter().enumerate() {
                println!(
                    "{} {}",
                    style(format!("{}.", i + 1)).bold(),
                    style(entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")).dim()
                );
                println!("   {}", entry.truncated_text.replace('\n', " "));
            }
        }
        HistoryCommand::Clear => {
            history.clear()?;
            println!(
                "{} Cleared history in {}",
                style("✓").green(),
                history_dir(&config).display()
            );
        }
    }

    Ok(())
}
