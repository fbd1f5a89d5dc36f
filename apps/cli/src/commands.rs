//! Subcommand handlers and text rendering.

use serde::Serialize;

use stockbook_core::{
    DashboardReport, NewProduct, PricingMode, ProductId, ProductRecord, SaleEvent, SheetFormat,
};
use stockbook_db::{CommandOutcome, Stockbook, TableStore};

use crate::config::AppConfig;
use crate::error::CliResult;
use crate::{AddArgs, Commands, TargetArgs};

pub(crate) async fn dispatch<S: TableStore>(
    book: &Stockbook<S>,
    config: &AppConfig,
    command: Commands,
    json: bool,
) -> CliResult<()> {
    let format = &book.settings().format;

    match command {
        Commands::Add(args) => {
            let outcome = book.add_product(new_product(args)).await?;
            if json {
                return print_json(&outcome);
            }
            let p = &outcome.value;
            println!(
                "Registered {} (id {}) • cost {} • margin {} • price {} • qty {}",
                p.name, p.id, p.unit_cost, p.margin, p.sale_price, p.stock_qty
            );
            render_totals(&outcome);
        }
        Commands::Remove(TargetArgs { id: Some(id), .. }) => {
            let outcome = book.remove_by_id(&ProductId::from_string(id.clone())).await?;
            if json {
                return print_json(&outcome);
            }
            match &outcome.value {
                Some(p) => println!("Removed {} (id {})", p.name, p.id),
                None => println!("No product with id {}", id),
            }
            render_totals(&outcome);
        }
        Commands::Remove(TargetArgs { name, .. }) => {
            let name = name.unwrap_or_default();
            let outcome = book.remove_product(&name).await?;
            if json {
                return print_json(&outcome);
            }
            println!("Removed {} product(s) named '{}'", outcome.value, name.trim());
            render_totals(&outcome);
        }
        Commands::Sell(TargetArgs { id: Some(id), .. }) => {
            let outcome = book.sell_by_id(&ProductId::from_string(id)).await?;
            render_sale(&outcome, format, json)?;
        }
        Commands::Sell(TargetArgs { name, .. }) => {
            let outcome = book.sell(&name.unwrap_or_default()).await?;
            render_sale(&outcome, format, json)?;
        }
        Commands::Sales(args) => {
            let mut sales = book.sales_descending().await?;
            if let Some(limit) = args.limit {
                sales.truncate(limit);
            }
            if json {
                return print_json(&sales);
            }
            if sales.is_empty() {
                println!("No sales recorded");
            }
            for sale in &sales {
                println!("{}", sale_line(sale, format));
            }
        }
        Commands::PurgeSales(args) => {
            let outcome = book.purge_sales_for(&args.product).await?;
            if json {
                return print_json(&outcome);
            }
            println!("Deleted {} sale(s) of '{}'", outcome.value, args.product.trim());
            render_totals(&outcome);
        }
        Commands::Summary => {
            let report = book.dashboard(&config.report_options()?).await?;
            if json {
                return print_json(&report);
            }
            render_dashboard(&report);
        }
        Commands::Products => {
            let products = book.products().await?;
            if json {
                return print_json(&products);
            }
            if products.is_empty() {
                println!("No products registered");
            }
            for p in &products {
                println!("{}", product_line(p, format));
            }
        }
        Commands::Init => {
            let created = book.ensure_sheets().await?;
            if json {
                return print_json(&created);
            }
            println!("{} worksheet(s) created", created);
        }
    }

    Ok(())
}

fn new_product(args: AddArgs) -> NewProduct {
    // clap's "pricing" group guarantees exactly one of the two
    let pricing = match (args.margin, args.price) {
        (_, Some(price)) => PricingMode::ByPrice(price),
        (Some(margin), None) => PricingMode::ByMargin(margin),
        (None, None) => PricingMode::ByMargin(Default::default()),
    };
    NewProduct::new(args.name, args.cost, args.qty, pricing)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_sale(
    outcome: &CommandOutcome<SaleEvent>,
    format: &SheetFormat,
    json: bool,
) -> CliResult<()> {
    if json {
        return print_json(outcome);
    }
    println!("Sold {}", sale_line(&outcome.value, format));
    render_totals(outcome);
    Ok(())
}

fn render_totals<T>(outcome: &CommandOutcome<T>) {
    let l = &outcome.ledger;
    println!(
        "Stock {} • invested {} • revenue {} • gross profit {} • balance {}",
        l.stock_total, l.investment_total, l.revenue_total, l.gross_profit_total, l.balance
    );
}

fn sale_line(sale: &SaleEvent, format: &SheetFormat) -> String {
    format!(
        "{} • {} • cost {} • price {} • profit {}",
        format.format_timestamp(sale.timestamp),
        sale.product_name,
        sale.unit_cost,
        sale.sale_price,
        sale.profit
    )
}

fn product_line(p: &ProductRecord, format: &SheetFormat) -> String {
    let last = p
        .last_action_at
        .map(|ts| format.format_timestamp(ts))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} • {} • cost {} • margin {} • suggested {} • price {} • stock {} • sold {} • {}",
        p.id,
        p.name,
        p.unit_cost,
        p.margin,
        p.suggested_price,
        p.sale_price,
        p.stock_qty,
        p.units_sold,
        last
    )
}

fn render_dashboard(report: &DashboardReport) {
    let l = &report.ledger;
    let j = &report.journal;

    println!("Inventory");
    println!("  units in stock   {}", l.stock_total);
    println!("  invested         {}", l.investment_total);
    println!("  revenue          {}", l.revenue_total);
    println!("  gross profit     {}", l.gross_profit_total);
    println!("  balance          {}", l.balance);

    println!("Sales");
    println!("  count            {}", j.count);
    println!("  revenue          {}", j.revenue_total);
    println!("  profit           {}", j.profit_total);
    println!("  average ticket   {}", j.avg_ticket);

    if report.goal.goal.is_positive() {
        println!(
            "Goal {} • achieved {} ({}.{:02}%) • remaining {}",
            report.goal.goal,
            report.goal.achieved,
            report.goal.percent_bps / 100,
            report.goal.percent_bps % 100,
            report.goal.remaining
        );
    }

    if !report.low_stock.is_empty() {
        println!("Low stock");
        for item in &report.low_stock {
            println!("  {} ({} left)", item.product_name, item.stock_qty);
        }
    }

    if !report.sales_by_product.is_empty() {
        println!("By product");
        for row in &report.sales_by_product {
            println!(
                "  {} • {} unit(s) • revenue {} • profit {}",
                row.product_name, row.units, row.revenue, row.profit
            );
        }
    }
}
