//! # Sheet Repository
//!
//! SQLite-backed worksheets.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sheets                          sheet_rows                            │
//! │  ┌────────────┬─────────────┐    ┌────────┬──────────┬──────────────┐  │
//! │  │ name (PK)  │ columns     │    │ sheet  │ position │ data         │  │
//! │  ├────────────┼─────────────┤    ├────────┼──────────┼──────────────┤  │
//! │  │ Estoque    │ ["Id",...]  │◄───│Estoque │ 0        │ {"Id":..}    │  │
//! │  │ Vendas     │ ["Data",..] │    │Estoque │ 1        │ {"Id":..}    │  │
//! │  └────────────┴─────────────┘    └────────┴──────────┴──────────────┘  │
//! │                                                                         │
//! │  save_tables = one transaction, per sheet:                             │
//! │    UPSERT sheets → DELETE sheet_rows → INSERT each row                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row as _, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::TableStore;
use stockbook_core::{Row, Table};

/// Worksheet store over the `sheets` / `sheet_rows` tables.
#[derive(Debug, Clone)]
pub struct SqliteTableStore {
    pool: SqlitePool,
}

impl SqliteTableStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteTableStore { pool }
    }

    /// Lists saved worksheet names, alphabetically.
    pub async fn sheet_names(&self) -> DbResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM sheets ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Drops a worksheet and its rows. Returns false if it did not exist.
    pub async fn delete_sheet(&self, sheet: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM sheets WHERE name = ?1")
            .bind(sheet)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TableStore for SqliteTableStore {
    async fn load_table(&self, sheet: &str) -> DbResult<Table> {
        let columns_json: Option<String> =
            sqlx::query_scalar("SELECT columns FROM sheets WHERE name = ?1")
                .bind(sheet)
                .fetch_optional(&self.pool)
                .await?;

        let columns_json = columns_json.ok_or_else(|| DbError::WorksheetNotFound(sheet.to_string()))?;
        let columns: Vec<String> = serde_json::from_str(&columns_json)?;

        let records = sqlx::query("SELECT data FROM sheet_rows WHERE sheet = ?1 ORDER BY position")
            .bind(sheet)
            .fetch_all(&self.pool)
            .await?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let data: String = record.try_get("data")?;
            rows.push(serde_json::from_str::<Row>(&data)?);
        }

        debug!(sheet = %sheet, rows = rows.len(), "Loaded worksheet");
        Ok(Table { columns, rows })
    }

    async fn save_table(&self, sheet: &str, table: &Table) -> DbResult<()> {
        self.save_tables(&[(sheet, table)]).await
    }

    /// Writes every sheet inside one transaction: all or nothing.
    async fn save_tables(&self, tables: &[(&str, &Table)]) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (sheet, table) in tables {
            write_sheet(&mut tx, sheet, table, &now).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (sheet, table) in tables {
            debug!(sheet = %sheet, rows = table.rows.len(), "Saved worksheet");
        }
        Ok(())
    }
}

/// Replaces one sheet's header and rows within `tx`.
async fn write_sheet(
    tx: &mut Transaction<'_, Sqlite>,
    sheet: &str,
    table: &Table,
    updated_at: &str,
) -> DbResult<()> {
    let columns_json = serde_json::to_string(&table.columns)?;

    sqlx::query(
        r#"
        INSERT INTO sheets (name, columns, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(name) DO UPDATE SET
            columns = excluded.columns,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(sheet)
    .bind(&columns_json)
    .bind(updated_at)
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM sheet_rows WHERE sheet = ?1")
        .bind(sheet)
        .execute(&mut **tx)
        .await?;

    for (position, row) in table.rows.iter().enumerate() {
        let data = serde_json::to_string(row)?;
        sqlx::query("INSERT INTO sheet_rows (sheet, position, data) VALUES (?1, ?2, ?3)")
            .bind(sheet)
            .bind(position as i64)
            .bind(&data)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::table::{INVENTORY_SCHEMA, SALES_SCHEMA};
    use stockbook_core::CellValue;

    async fn store() -> (Database, SqliteTableStore) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = db.sheets();
        (db, store)
    }

    fn sales_table() -> Table {
        let mut table = Table::empty(SALES_SCHEMA);
        table.push(
            Row::new()
                .with("Data", "01/03/2024 10:00:00")
                .with("Produto", "Widget")
                .with("Custo", 10.0)
                .with("Venda", 15.5)
                .with("Lucro", 5.5),
        );
        table.push(
            Row::new()
                .with("Data", "02/03/2024 11:30:00")
                .with("Produto", "Gadget")
                .with("Custo", 4i64)
                .with("Venda", 6i64)
                .with("Lucro", 2i64),
        );
        table
    }

    #[tokio::test]
    async fn test_missing_sheet_is_reported() {
        let (_db, store) = store().await;

        let err = store.load_table("Vendas").await.unwrap_err();
        assert!(matches!(err, DbError::WorksheetNotFound(ref name) if name == "Vendas"));
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order_and_cells() {
        let (_db, store) = store().await;
        let table = sales_table();

        store.save_table("Vendas", &table).await.unwrap();
        let loaded = store.load_table("Vendas").await.unwrap();

        assert_eq!(loaded, table);
        assert_eq!(loaded.rows[1].get("Produto"), &CellValue::Text("Gadget".to_string()));
        assert_eq!(loaded.rows[1].get("Custo"), &CellValue::Integer(4));
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_sheet() {
        let (_db, store) = store().await;
        store.save_table("Vendas", &sales_table()).await.unwrap();

        let mut shorter = Table::empty(SALES_SCHEMA);
        shorter.push(sales_table().rows.remove(1));
        store.save_table("Vendas", &shorter).await.unwrap();

        let loaded = store.load_table("Vendas").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.rows[0].get("Produto"), &CellValue::Text("Gadget".to_string()));
    }

    #[tokio::test]
    async fn test_empty_sheet_exists_after_save() {
        let (_db, store) = store().await;
        store.save_table("Estoque", &Table::empty(INVENTORY_SCHEMA)).await.unwrap();

        let loaded = store.load_table("Estoque").await.unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.columns.len(), INVENTORY_SCHEMA.len());
    }

    #[tokio::test]
    async fn test_save_tables_writes_all_sheets() {
        let (_db, store) = store().await;
        let inventory = Table::empty(INVENTORY_SCHEMA);
        let sales = sales_table();

        store
            .save_tables(&[("Estoque", &inventory), ("Vendas", &sales)])
            .await
            .unwrap();

        assert_eq!(store.load_table("Estoque").await.unwrap(), inventory);
        assert_eq!(store.load_table("Vendas").await.unwrap(), sales);
    }

    #[tokio::test]
    async fn test_failed_save_tables_rolls_back() {
        let (db, store) = store().await;
        store.save_table("Vendas", &sales_table()).await.unwrap();

        // Break the second write so the transaction cannot commit
        sqlx::query("DROP TABLE sheet_rows")
            .execute(db.pool())
            .await
            .unwrap();
        let result = store
            .save_tables(&[("Estoque", &Table::empty(INVENTORY_SCHEMA)), ("Vendas", &sales_table())])
            .await;
        assert!(result.is_err());

        assert_eq!(store.sheet_names().await.unwrap(), vec!["Vendas"]);
    }

    #[tokio::test]
    async fn test_sheets_are_independent() {
        let (_db, store) = store().await;
        store.save_table("Vendas", &sales_table()).await.unwrap();
        store.save_table("Estoque", &Table::empty(INVENTORY_SCHEMA)).await.unwrap();

        assert_eq!(store.sheet_names().await.unwrap(), vec!["Estoque", "Vendas"]);
        assert_eq!(store.load_table("Vendas").await.unwrap().len(), 2);

        assert!(store.delete_sheet("Vendas").await.unwrap());
        assert!(!store.delete_sheet("Vendas").await.unwrap());
        assert!(store.load_table("Vendas").await.is_err());
        assert!(store.load_table("Estoque").await.is_ok());
    }
}
