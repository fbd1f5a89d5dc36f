//! # Repository Module
//!
//! Worksheet storage behind one narrow seam.
//!
//! ## Table Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Whole-Table Load / Overwrite                         │
//! │                                                                         │
//! │  Stockbook service                                                     │
//! │       │                                                                 │
//! │       │  store.load_table("Estoque")                                   │
//! │       │  ↓  mutate the ledger in memory                                │
//! │       │  store.save_table("Estoque", &table)                           │
//! │       ▼                                                                 │
//! │  dyn TableStore                                                        │
//! │  ├── SqliteTableStore  (sheets + sheet_rows tables)                    │
//! │  └── MemoryTableStore  (HashMap, tests and dry runs)                   │
//! │                                                                         │
//! │  There is no row-level update: every save replaces the whole sheet.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Stores
//!
//! - [`SqliteTableStore`](sheet::SqliteTableStore) - Durable local worksheets
//! - [`MemoryTableStore`](memory::MemoryTableStore) - Process-local worksheets

use async_trait::async_trait;
use stockbook_core::Table;

use crate::error::DbResult;

pub mod memory;
pub mod sheet;

/// Tabular storage addressed by worksheet name.
///
/// ## Contract
/// - `load_table` returns [`DbError::WorksheetNotFound`](crate::DbError::WorksheetNotFound)
///   when the sheet was never saved. Callers decide whether that is fatal.
/// - `save_table` replaces the sheet's header and rows atomically, creating
///   the sheet if needed. Row order is preserved.
/// - `save_tables` saves several sheets. Stores that can do it in one
///   transaction override it; the default saves them in order.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn load_table(&self, sheet: &str) -> DbResult<Table>;

    async fn save_table(&self, sheet: &str, table: &Table) -> DbResult<()>;

    async fn save_tables(&self, tables: &[(&str, &Table)]) -> DbResult<()> {
        for (sheet, table) in tables {
            self.save_table(sheet, table).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T: TableStore + ?Sized> TableStore for std::sync::Arc<T> {
    async fn load_table(&self, sheet: &str) -> DbResult<Table> {
        (**self).load_table(sheet).await
    }

    async fn save_table(&self, sheet: &str, table: &Table) -> DbResult<()> {
        (**self).save_table(sheet, table).await
    }

    async fn save_tables(&self, tables: &[(&str, &Table)]) -> DbResult<()> {
        (**self).save_tables(tables).await
    }
}
