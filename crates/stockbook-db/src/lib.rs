//! # stockbook-db: Worksheet Storage for Stockbook
//!
//! This crate loads and overwrites the inventory and sales worksheets and
//! runs the bookkeeping commands against them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  CLI subcommand (sell Widget)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Stockbook   │    │  TableStore   │    │  Migrations  │  │   │
//! │  │   │ (service.rs)  │───►│ (repository)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ load → mutate │    │ SqliteStore   │    │ 001_sheets   │  │   │
//! │  │   │ → overwrite   │    │ MemoryStore   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/stockbook/stockbook.db                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - The `TableStore` seam and its two stores
//! - [`service`] - Bookkeeping commands and queries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Database, DbConfig, Stockbook, StockbookSettings};
//!
//! let db = Database::new(DbConfig::new("stockbook.db")).await?;
//! let book = Stockbook::new(db.sheets(), StockbookSettings::default());
//!
//! let outcome = book.sell("Widget").await?;
//! println!("balance: {}", outcome.ledger.balance);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::memory::MemoryTableStore;
pub use repository::sheet::SqliteTableStore;
pub use repository::TableStore;
pub use service::{CommandOutcome, Stockbook, StockbookSettings};
