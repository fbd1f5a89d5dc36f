//! # Stockbook CLI Entry Point
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                             │
//! │  2. Initialize tracing (stderr, RUST_LOG overrides the default)        │
//! │  3. Load config: defaults → stockbook.toml → STOCKBOOK_* env           │
//! │  4. Open the table store                                               │
//! │     • sqlite: Database::new (WAL, migrations) → db.sheets()            │
//! │     • memory: MemoryTableStore (one-command dry run, empty sheets)     │
//! │  5. Run one subcommand through Stockbook                               │
//! │  6. Print the outcome; errors go to stderr with a non-zero exit code   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, Backend};
use error::CliResult;
use stockbook_core::{Margin, Money};
use stockbook_db::{Database, DbConfig, MemoryTableStore, Stockbook, TableStore};

#[derive(Parser)]
#[command(name = "stockbook", about = "Inventory and sales bookkeeping", version)]
struct Cli {
    #[arg(long, global = true, help = "Path to a stockbook.toml config file")]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a product
    Add(AddArgs),
    /// Remove every product with a name, or one product by id
    Remove(TargetArgs),
    /// Sell one unit
    Sell(TargetArgs),
    /// List sales, newest first
    Sales(SalesArgs),
    /// Delete every sale of a product
    PurgeSales(PurgeArgs),
    /// Show the dashboard totals
    Summary,
    /// List products
    Products,
    /// Create the worksheets if they are missing
    Init,
}

#[derive(Args)]
#[command(group(ArgGroup::new("pricing").required(true).args(["margin", "price"])))]
struct AddArgs {
    #[arg(help = "Product name")]
    name: String,
    #[arg(long, value_parser = parse_money, help = "Unit cost, e.g. 10.50 or 10,50")]
    cost: Money,
    #[arg(long, default_value_t = 1, help = "Units acquired")]
    qty: u32,
    #[arg(long, value_parser = parse_margin, help = "Markup over cost in percent, e.g. 50")]
    margin: Option<Margin>,
    #[arg(long, value_parser = parse_money, help = "Sale price; the margin is derived from it")]
    price: Option<Money>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["name", "id"])))]
struct TargetArgs {
    #[arg(help = "Product name (first match for sell, all matches for remove)")]
    name: Option<String>,
    #[arg(long, help = "Product id")]
    id: Option<String>,
}

#[derive(Args)]
struct SalesArgs {
    #[arg(long, help = "Show at most this many sales")]
    limit: Option<usize>,
}

#[derive(Args)]
struct PurgeArgs {
    #[arg(long, help = "Product name whose sales are deleted")]
    product: String,
}

fn parse_money(raw: &str) -> Result<Money, String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed);
    trimmed
        .trim()
        .parse::<Money>()
        .map_err(|e| format!("invalid amount '{raw}': {e}"))
}

fn parse_margin(raw: &str) -> Result<Margin, String> {
    raw.parse::<Margin>()
        .map_err(|e| format!("invalid margin '{raw}': {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::load(cli.config)?;
    let settings = config.service_settings()?;

    let (store, db): (Arc<dyn TableStore>, Option<Database>) = match config.store.backend {
        Backend::Sqlite => {
            let path = config.database_path()?;
            info!(?path, "Opening worksheet database");
            let db = Database::new(DbConfig::new(path)).await?;
            (Arc::new(db.sheets()), Some(db))
        }
        Backend::Memory => {
            warn!("Using in-memory worksheets: this command starts from empty sheets and saves nothing");
            (Arc::new(MemoryTableStore::new()), None)
        }
    };

    let book = Stockbook::new(store, settings);
    let result = commands::dispatch(&book, &config, cli.command, cli.json).await;

    if let Some(db) = db {
        db.close().await;
    }
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockbook=trace` - Show trace for stockbook crates only
/// - Default: INFO, DEBUG for stockbook crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_requires_exactly_one_pricing_mode() {
        assert!(Cli::try_parse_from(["stockbook", "add", "Widget", "--cost", "10"]).is_err());
        assert!(Cli::try_parse_from([
            "stockbook", "add", "Widget", "--cost", "10", "--margin", "50", "--price", "15"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "stockbook", "add", "Widget", "--cost", "10,00", "--qty", "3", "--margin", "50",
        ])
        .unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.cost, Money::from_cents(1000));
                assert_eq!(args.qty, 3);
                assert_eq!(args.margin, Some(Margin::from_bps(5000)));
                assert!(args.price.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_sell_accepts_name_or_id() {
        let cli = Cli::try_parse_from(["stockbook", "sell", "Widget"]).unwrap();
        assert!(matches!(cli.command, Commands::Sell(TargetArgs { name: Some(_), id: None })));

        let cli = Cli::try_parse_from(["stockbook", "--json", "sell", "--id", "abc"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Sell(TargetArgs { name: None, id: Some(_) })));

        assert!(Cli::try_parse_from(["stockbook", "sell"]).is_err());
    }

    #[test]
    fn test_parse_money_accepts_currency_prefix() {
        assert_eq!(parse_money("R$ 12,34").unwrap(), Money::from_cents(1234));
        assert!(parse_money("twelve").is_err());
    }
}
