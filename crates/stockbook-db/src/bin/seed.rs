//! # Demo Workbook Generator
//!
//! Fills an empty workbook with products and a few sales for development.
//!
//! ## Usage
//! ```bash
//! # 40 products (default)
//! cargo run -p stockbook-db --bin seed
//!
//! # Custom amount and database
//! cargo run -p stockbook-db --bin seed -- --count 200 --db ./data/stockbook.db
//! ```
//!
//! ## Generated Data
//! - Name: `{item} {size}`
//! - Cost: 2.00 - 45.99
//! - Every third product is priced by margin (20% - 115%), the rest by a
//!   fixed sale price 10% - 89% over cost
//! - Stock: 0 - 24
//! - Sales: one unit of every fifth product still in stock

use std::env;

use chrono::{Duration, SubsecRound, Utc};
use stockbook_core::table::{journal_to_table, ledger_to_table};
use stockbook_core::{
    InventoryLedger, Margin, Money, NewProduct, PricingMode, SalesJournal, SheetFormat,
    DEFAULT_INVENTORY_SHEET, DEFAULT_SALES_SHEET,
};
use stockbook_db::{Database, DbConfig, TableStore};

const ITEMS: &[&str] = &[
    "Caneca", "Camiseta", "Bone", "Chaveiro", "Adesivo", "Caderno", "Caneta", "Ecobag",
    "Garrafa", "Poster",
];

const SIZES: &[(&str, i64)] = &[("P", 0), ("M", 250), ("G", 500), ("GG", 900)];

/// Parsed command line. `None` from [`parse_args`] means help was printed.
#[derive(Debug, PartialEq)]
struct SeedArgs {
    count: usize,
    db_path: String,
}

fn parse_args(args: &[String]) -> Result<Option<SeedArgs>, String> {
    let mut parsed = SeedArgs {
        count: 40,
        db_path: String::from("./stockbook_dev.db"),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                let raw = args.get(i + 1).ok_or("--count needs a value")?;
                parsed.count = raw
                    .parse()
                    .map_err(|_| format!("--count expects a whole number, got '{}'", raw))?;
                i += 1;
            }
            "--db" | "-d" => {
                parsed.db_path = args.get(i + 1).ok_or("--db needs a path")?.clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Stockbook Demo Workbook Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(None);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
        i += 1;
    }

    Ok(Some(parsed))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let SeedArgs { count, db_path } = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return Ok(()),
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    println!("Stockbook Demo Workbook Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.sheets();

    if !store.sheet_names().await?.is_empty() {
        println!("Workbook already has sheets, skipping seed to avoid duplicates.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let format = SheetFormat::default();
    let now = Utc::now().trunc_subsecs(0);
    let mut ledger = InventoryLedger::new();
    let mut journal = SalesJournal::new();

    for seed in 0..count {
        let item = ITEMS[seed % ITEMS.len()];
        let (size, addon) = SIZES[(seed / ITEMS.len()) % SIZES.len()];
        // Earlier products were registered earlier
        let registered_at = now - Duration::hours((count - seed) as i64);

        let product = generate_product(item, size, addon, seed);
        ledger.add_product(product, registered_at)?;
    }

    let names: Vec<String> = ledger.names().into_iter().map(str::to_string).collect();
    for (seed, name) in names.iter().enumerate().filter(|(seed, _)| seed % 5 == 0) {
        let sold_at = now - Duration::minutes((count - seed) as i64);
        if let Ok(event) = ledger.sell(name, sold_at) {
            journal.append(event);
        }
    }

    store
        .save_tables(&[
            (DEFAULT_INVENTORY_SHEET, &ledger_to_table(&ledger, &format)),
            (DEFAULT_SALES_SHEET, &journal_to_table(&journal, &format)),
        ])
        .await?;

    let summary = ledger.aggregate();
    println!("Generated {} products and {} sales", ledger.len(), journal.len());
    println!(
        "  invested {} • revenue {} • balance {}",
        summary.investment_total, summary.revenue_total, summary.balance
    );

    db.close().await;
    println!();
    println!("Seed complete!");

    Ok(())
}

/// Builds one product with deterministic data.
fn generate_product(item: &str, size: &str, addon: i64, seed: usize) -> NewProduct {
    let cost = Money::from_cents(200 + ((seed * 37) % 3500) as i64 + addon);
    let stock = (seed % 25) as u32;

    let pricing = if seed % 3 == 0 {
        PricingMode::ByMargin(Margin::from_bps(2000 + ((seed * 13) % 96) as i64 * 100))
    } else {
        let markup = 110 + (seed % 80) as i64;
        PricingMode::ByPrice(Money::from_cents(cost.cents() * markup / 100))
    };

    NewProduct::new(format!("{} {}", item, size), cost, stock, pricing)
}
