//! CLI application for Latvian business document analysis.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analyze, config, history};

/// Latvian document analysis - classify, summarize and extract OCR text
/// of invoices, delivery notes and receipts
#[derive(Parser)]
#[command(name = "lvdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the document type of a text
    Detect(analyze::DetectArgs),

    /// Summarize a document
    Summarize(analyze::SummarizeArgs),

    /// Extract structured data from a document
    Extract(analyze::ExtractArgs),

    /// Detect, summarize and extract in one run
    Process(analyze::ProcessArgs),

    /// Show or clear recent inputs
    History(history::HistoryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Detect(args) => analyze::detect(args, config_path).await,
        Commands::Summarize(args) => analyze::summarize(args, config_path).await,
        Commands::Extract(args) => analyze::extract(args, config_path).await,
        Commands::Process(args) => analyze::process(args, config_path).await,
        Commands::History(args) => history::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
