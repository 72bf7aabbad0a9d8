//! `airgst`: pulls GST fields out of airline tax invoices.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, classify, config, process};

const LONG_ABOUT: &str = "\
Reads airline GST tax invoices (PDF or extracted text), detects the issuing
carrier and emits one fixed-column record per invoice: supplier and customer
GSTINs, invoice number and date, PNR, sector, taxable value, CGST/SGST/IGST/CESS
and totals. Amounts are reconciled so that taxable value plus taxes matches the
invoice total; mismatches are reported as warnings.

Logging goes to stderr. Use -v/-vv/-vvv, or set RUST_LOG for finer control.";

/// Extract GST fields from airline tax invoices
#[derive(Parser)]
#[command(name = "airgst")]
#[command(author, version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Log more (-v reconciliation notes, -vv rule matches, -vvv everything)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (defaults to airgst/config.json in the user config directory)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one invoice to JSON or CSV
    Process(process::ProcessArgs),

    /// Extract every invoice matching a glob into a directory with a summary CSV
    Batch(batch::BatchArgs),

    /// Print the airline format detected for each invoice
    Classify(classify::ClassifyArgs),

    /// Show or edit extraction settings
    Config(config::ConfigArgs),
}

/// Filter for the extraction crates at the verbosity asked for.
/// `RUST_LOG` takes precedence when set.
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,airgst={level},airgst_core={level}")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Classify(args) => classify::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
