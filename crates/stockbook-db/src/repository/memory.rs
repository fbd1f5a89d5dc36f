//! In-memory worksheets for tests and `backend = "memory"` dry runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{DbError, DbResult};
use crate::repository::TableStore;
use stockbook_core::Table;

/// Worksheets held in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    sheets: Mutex<HashMap<String, Table>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a sheet without going through the trait.
    pub fn with_sheet(sheet: &str, table: Table) -> Self {
        let mut sheets = HashMap::new();
        sheets.insert(sheet.to_string(), table);
        MemoryTableStore {
            sheets: Mutex::new(sheets),
        }
    }

    pub async fn contains(&self, sheet: &str) -> bool {
        self.sheets.lock().await.contains_key(sheet)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn load_table(&self, sheet: &str) -> DbResult<Table> {
        self.sheets
            .lock()
            .await
            .get(sheet)
            .cloned()
            .ok_or_else(|| DbError::WorksheetNotFound(sheet.to_string()))
    }

    async fn save_table(&self, sheet: &str, table: &Table) -> DbResult<()> {
        self.sheets.lock().await.insert(sheet.to_string(), table.clone());
        Ok(())
    }

    async fn save_tables(&self, tables: &[(&str, &Table)]) -> DbResult<()> {
        let mut sheets = self.sheets.lock().await;
        for (sheet, table) in tables {
            sheets.insert(sheet.to_string(), (*table).clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::table::SALES_SCHEMA;
    use stockbook_core::Row;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTableStore::new();
        assert!(matches!(
            store.load_table("Vendas").await,
            Err(DbError::WorksheetNotFound(_))
        ));

        let mut table = Table::empty(SALES_SCHEMA);
        table.push(Row::new().with("Produto", "Widget"));
        store.save_table("Vendas", &table).await.unwrap();

        assert!(store.contains("Vendas").await);
        assert_eq!(store.load_table("Vendas").await.unwrap(), table);
    }

    #[tokio::test]
    async fn test_seeded_sheet_is_loadable() {
        let store = MemoryTableStore::with_sheet("Estoque", Table::empty(SALES_SCHEMA));
        assert!(store.load_table("Estoque").await.unwrap().is_empty());
    }
}
