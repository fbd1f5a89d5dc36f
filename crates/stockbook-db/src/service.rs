//! # Stockbook Service
//!
//! Commands and queries over the inventory and sales worksheets.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    sell("Widget")                                       │
//! │                                                                         │
//! │  1. load_table(Estoque) ──► ledger_from_table ──► InventoryLedger      │
//! │  2. load_table(Vendas)  ──► journal_from_table ─► SalesJournal         │
//! │     (missing sheet → empty table, logged at warn)                      │
//! │                                                                         │
//! │  3. ledger.sell(name, now) ──► SaleEvent                               │
//! │     journal.append(event)                                              │
//! │                                                                         │
//! │  4. save_tables([Estoque: whole ledger, Vendas: whole journal])       │
//! │     (one transaction on SQLite)                                        │
//! │                                                                         │
//! │  5. CommandOutcome { value: SaleEvent, ledger, journal summaries }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Every command is load → mutate → overwrite with no version check. Two
//! processes writing the same sheets race and the later save wins, silently
//! dropping the other's change. Run one writer per workbook.
//!
//! A sell saves both sheets through `save_tables`. The SQLite store commits
//! them together; a store without transactions writes the inventory sheet
//! first, so a failure in between leaves stock decremented without a journal
//! line.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::TableStore;
use stockbook_core::table::{
    journal_from_table, journal_to_table, ledger_from_table, ledger_to_table, INVENTORY_SCHEMA,
    SALES_SCHEMA,
};
use stockbook_core::{
    DashboardReport, InventoryLedger, JournalSummary, LedgerSummary, NewProduct, ProductId,
    ProductRecord, ReportOptions, SaleEvent, SalesJournal, SheetFormat, Table,
    DEFAULT_INVENTORY_SHEET, DEFAULT_SALES_SHEET,
};

// =============================================================================
// Settings
// =============================================================================

/// Which sheets to use and how to render dates in them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockbookSettings {
    pub inventory_sheet: String,
    pub sales_sheet: String,
    pub format: SheetFormat,
}

impl Default for StockbookSettings {
    fn default() -> Self {
        StockbookSettings {
            inventory_sheet: DEFAULT_INVENTORY_SHEET.to_string(),
            sales_sheet: DEFAULT_SALES_SHEET.to_string(),
            format: SheetFormat::default(),
        }
    }
}

// =============================================================================
// Command Outcome
// =============================================================================

/// Result of a mutating command plus the aggregates after it committed.
///
/// The front end decides whether to re-render from these or re-query.
/// `journal` is `None` only for inventory commands that ran while the sales
/// sheet could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome<T> {
    pub value: T,
    pub ledger: LedgerSummary,
    pub journal: Option<JournalSummary>,
}

impl<T> CommandOutcome<T> {
    fn new(value: T, ledger: &InventoryLedger, journal: Option<JournalSummary>) -> Self {
        CommandOutcome {
            value,
            ledger: ledger.aggregate(),
            journal,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Command/query orchestrator over a [`TableStore`].
pub struct Stockbook<S: TableStore> {
    store: S,
    settings: StockbookSettings,
    clock: fn() -> DateTime<Utc>,
}

/// Current time at sheet precision (whole seconds).
fn system_clock() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

impl<S: TableStore> Stockbook<S> {
    pub fn new(store: S, settings: StockbookSettings) -> Self {
        Stockbook {
            store,
            settings,
            clock: system_clock,
        }
    }

    /// Replaces the time source used to stamp records and sales.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &StockbookSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Loads a sheet, substituting an empty `schema` table if it is missing.
    async fn load_or_empty(&self, sheet: &str, schema: &[&str]) -> DbResult<Table> {
        match self.store.load_table(sheet).await {
            Ok(table) => Ok(table),
            Err(DbError::WorksheetNotFound(name)) => {
                warn!(sheet = %name, "Worksheet not found, starting from an empty table");
                Ok(Table::empty(schema))
            }
            Err(err) => Err(err),
        }
    }

    /// Loads the inventory ledger. A missing sheet is an empty ledger.
    pub async fn load_ledger(&self) -> DbResult<InventoryLedger> {
        let table = self
            .load_or_empty(&self.settings.inventory_sheet, INVENTORY_SCHEMA)
            .await?;
        let ledger = ledger_from_table(&table, &self.settings.format)?;
        debug!(products = ledger.len(), "Inventory ledger loaded");
        Ok(ledger)
    }

    /// Loads the sales journal. A missing sheet is an empty journal.
    pub async fn load_journal(&self) -> DbResult<SalesJournal> {
        let table = self.load_or_empty(&self.settings.sales_sheet, SALES_SCHEMA).await?;
        let journal = journal_from_table(&table, &self.settings.format)?;
        debug!(sales = journal.len(), "Sales journal loaded");
        Ok(journal)
    }

    /// Journal totals for commands that never write the sales sheet.
    ///
    /// A sales sheet with bad rows is logged and reported as `None` so it
    /// cannot block inventory edits. Storage failures still propagate.
    async fn journal_summary(&self) -> DbResult<Option<JournalSummary>> {
        match self.load_journal().await {
            Ok(journal) => Ok(Some(journal.aggregate())),
            Err(DbError::Domain(err)) => {
                warn!(
                    sheet = %self.settings.sales_sheet,
                    error = %err,
                    "Sales sheet unreadable, journal totals omitted"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn save_ledger(&self, ledger: &InventoryLedger) -> DbResult<()> {
        let table = ledger_to_table(ledger, &self.settings.format);
        self.store
            .save_table(&self.settings.inventory_sheet, &table)
            .await
    }

    async fn save_journal(&self, journal: &SalesJournal) -> DbResult<()> {
        let table = journal_to_table(journal, &self.settings.format);
        self.store.save_table(&self.settings.sales_sheet, &table).await
    }

    /// Writes header-only sheets for any that do not exist yet.
    ///
    /// Returns how many sheets were created.
    pub async fn ensure_sheets(&self) -> DbResult<usize> {
        let mut created = 0;
        for (sheet, schema) in [
            (&self.settings.inventory_sheet, INVENTORY_SCHEMA),
            (&self.settings.sales_sheet, SALES_SCHEMA),
        ] {
            match self.store.load_table(sheet).await {
                Ok(_) => {}
                Err(DbError::WorksheetNotFound(_)) => {
                    self.store.save_table(sheet, &Table::empty(schema)).await?;
                    info!(sheet = %sheet, "Created worksheet");
                    created += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(created)
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Registers a product and saves the inventory sheet.
    pub async fn add_product(&self, input: NewProduct) -> DbResult<CommandOutcome<ProductRecord>> {
        let mut ledger = self.load_ledger().await?;
        let journal = self.journal_summary().await?;

        let record = ledger.add_product(input, (self.clock)())?;
        self.save_ledger(&ledger).await?;

        info!(
            id = %record.id,
            name = %record.name,
            cost = %record.unit_cost,
            price = %record.sale_price,
            qty = record.stock_qty,
            "Product registered"
        );
        Ok(CommandOutcome::new(record, &ledger, journal))
    }

    /// Removes every product named `name`. Zero matches is not an error and
    /// leaves the sheet untouched.
    pub async fn remove_product(&self, name: &str) -> DbResult<CommandOutcome<usize>> {
        let mut ledger = self.load_ledger().await?;
        let journal = self.journal_summary().await?;

        let name = name.trim();
        let removed = ledger.remove_product(name);
        if removed > 0 {
            self.save_ledger(&ledger).await?;
            info!(name = %name, removed, "Products removed");
        } else {
            debug!(name = %name, "No product matched, nothing removed");
        }
        Ok(CommandOutcome::new(removed, &ledger, journal))
    }

    /// Removes the product with `id`, if present.
    pub async fn remove_by_id(
        &self,
        id: &ProductId,
    ) -> DbResult<CommandOutcome<Option<ProductRecord>>> {
        let mut ledger = self.load_ledger().await?;
        let journal = self.journal_summary().await?;

        let removed = ledger.remove_by_id(id);
        if let Some(record) = &removed {
            self.save_ledger(&ledger).await?;
            info!(id = %id, name = %record.name, "Product removed");
        }
        Ok(CommandOutcome::new(removed, &ledger, journal))
    }

    /// Sells one unit of the first product named `name`.
    pub async fn sell(&self, name: &str) -> DbResult<CommandOutcome<SaleEvent>> {
        let mut ledger = self.load_ledger().await?;
        let ts = (self.clock)();
        let outcome = ledger.sell(name.trim(), ts);
        self.commit_sale(ledger, outcome).await
    }

    /// Sells one unit of the product with `id`.
    pub async fn sell_by_id(&self, id: &ProductId) -> DbResult<CommandOutcome<SaleEvent>> {
        let mut ledger = self.load_ledger().await?;
        let ts = (self.clock)();
        let outcome = ledger.sell_by_id(id, ts);
        self.commit_sale(ledger, outcome).await
    }

    async fn commit_sale(
        &self,
        ledger: InventoryLedger,
        outcome: stockbook_core::CoreResult<SaleEvent>,
    ) -> DbResult<CommandOutcome<SaleEvent>> {
        let event = match outcome {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "Sale rejected");
                return Err(err.into());
            }
        };

        let mut journal = self.load_journal().await?;
        journal.append(event.clone());

        let inventory = ledger_to_table(&ledger, &self.settings.format);
        let sales = journal_to_table(&journal, &self.settings.format);
        self.store
            .save_tables(&[
                (self.settings.inventory_sheet.as_str(), &inventory),
                (self.settings.sales_sheet.as_str(), &sales),
            ])
            .await?;

        info!(
            product = %event.product_name,
            price = %event.sale_price,
            profit = %event.profit,
            "Sale recorded"
        );
        Ok(CommandOutcome::new(event, &ledger, Some(journal.aggregate())))
    }

    /// Deletes every sale matching `predicate` and rewrites the sales sheet.
    ///
    /// Inventory counters are not touched.
    pub async fn remove_sales_where<F>(&self, predicate: F) -> DbResult<CommandOutcome<usize>>
    where
        F: FnMut(&SaleEvent) -> bool + Send,
    {
        let ledger = self.load_ledger().await?;
        let mut journal = self.load_journal().await?;

        let removed = journal.remove_where(predicate);
        if removed > 0 {
            self.save_journal(&journal).await?;
            info!(removed, "Sales removed");
        }
        Ok(CommandOutcome::new(removed, &ledger, Some(journal.aggregate())))
    }

    /// Deletes every sale of the product named `name`.
    pub async fn purge_sales_for(&self, name: &str) -> DbResult<CommandOutcome<usize>> {
        let target = name.trim().to_string();
        self.remove_sales_where(move |event| event.product_name == target)
            .await
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub async fn products(&self) -> DbResult<Vec<ProductRecord>> {
        Ok(self.load_ledger().await?.into_records())
    }

    /// All sales, newest first.
    pub async fn sales_descending(&self) -> DbResult<Vec<SaleEvent>> {
        let journal = self.load_journal().await?;
        Ok(journal.list_descending().cloned().collect())
    }

    /// Builds the full dashboard from fresh loads of both sheets.
    pub async fn dashboard(&self, options: &ReportOptions) -> DbResult<DashboardReport> {
        let ledger = self.load_ledger().await?;
        let journal = self.load_journal().await?;
        Ok(DashboardReport::build(&ledger, &journal, options))
    }
}
