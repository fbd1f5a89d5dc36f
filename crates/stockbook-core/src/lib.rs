//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook. It holds the inventory ledger,
//! the sales journal, and their aggregations as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front end (CLI / dashboard)                  │   │
//! │  │    Add product ──► Sell (+1) ──► Sales history ──► Summary      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockbook-db (Stockbook service)                  │   │
//! │  │        load table ──► mutate ──► overwrite whole table          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │  journal  │  │   money   │  │   table   │  │   │
//! │  │   │ Inventory │  │   Sales   │  │   Money   │  │ CellValue │  │   │
//! │  │   │  Ledger   │  │  Journal  │  │  Margin   │  │  codecs   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductRecord, SaleEvent, PricingMode)
//! - [`money`] - Money (integer cents) and Margin (basis points)
//! - [`ledger`] - InventoryLedger: add, remove, sell, aggregate
//! - [`journal`] - SalesJournal: append, aggregate, bulk removal
//! - [`report`] - Dashboard report and profit goal progress
//! - [`table`] - Sheet rows, schemas, and codecs
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use stockbook_core::money::{Margin, Money};
//! use stockbook_core::{InventoryLedger, NewProduct, PricingMode, SalesJournal};
//!
//! let mut ledger = InventoryLedger::new();
//! let mut journal = SalesJournal::new();
//!
//! ledger
//!     .add_product(
//!         NewProduct::new("Widget", Money::from_cents(1000), 1, PricingMode::ByMargin(Margin::from_bps(5000))),
//!         Utc::now(),
//!     )
//!     .unwrap();
//!
//! journal.append(ledger.sell("Widget", Utc::now()).unwrap());
//!
//! let summary = ledger.aggregate();
//! assert_eq!(summary.balance.cents(), 500);
//! assert_eq!(journal.aggregate().avg_ticket.cents(), 1500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod journal;
pub mod ledger;
pub mod money;
pub mod report;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use journal::{JournalSummary, SalesJournal};
pub use ledger::{InventoryLedger, LedgerSummary};
pub use money::{Margin, Money};
pub use report::{DashboardReport, ProfitGoal, ReportOptions};
pub use table::{CellValue, Row, SheetFormat, Table};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest stock quantity accepted on registration.
///
/// Catches typos like 10000 instead of 100 on the add-product form.
pub const MAX_STOCK_QUANTITY: u32 = 100_000;

/// Largest cost or price magnitude, in cents.
///
/// An amount this size times MAX_STOCK_QUANTITY still fits in an i64.
pub const MAX_AMOUNT_CENTS: i64 = i64::MAX / MAX_STOCK_QUANTITY as i64;

/// Default worksheet holding the product table.
pub const DEFAULT_INVENTORY_SHEET: &str = "Estoque";

/// Default worksheet holding the sales history.
pub const DEFAULT_SALES_SHEET: &str = "Vendas";
