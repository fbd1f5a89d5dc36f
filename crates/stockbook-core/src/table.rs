//! # Sheet Tables
//!
//! The row model shared with the table store, the fixed column schemas, and
//! the codecs that turn tables into a ledger or a journal and back.
//!
//! ## Persisted Schemas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inventory sheet                                                        │
//! │  Id | Produto | Custo | Margem_% | Preco_Sugerido | Preco_Venda |      │
//! │     Qtd_Estoque | Vendas_Realizadas | Data_Ultima_Acao                 │
//! │                                                                         │
//! │  Sales sheet                                                            │
//! │  Data | Produto | Custo | Venda | Lucro                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! `Id`, `Preco_Sugerido`, and `Data_Ultima_Acao` are optional on load so
//! sheets written by older dashboards still decode. Rows without an `Id` get
//! a fresh one, which the next save persists.
//!
//! ## Cell Tolerance
//! Spreadsheets hand back numbers as integers, floats (`3.0` for a count),
//! or text with either decimal separator (`"10,50"`). All of those decode.
//! A negative count is rejected, since stock can never go below zero.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::journal::SalesJournal;
use crate::ledger::InventoryLedger;
use crate::money::{Margin, Money};
use crate::types::{ProductId, ProductRecord, SaleEvent};
use crate::validation::{validate_amount_bound, validate_date_format};

// =============================================================================
// Column Names
// =============================================================================

pub const COL_ID: &str = "Id";
pub const COL_PRODUCT: &str = "Produto";
pub const COL_COST: &str = "Custo";
pub const COL_MARGIN: &str = "Margem_%";
pub const COL_SUGGESTED_PRICE: &str = "Preco_Sugerido";
pub const COL_SALE_PRICE: &str = "Preco_Venda";
pub const COL_STOCK: &str = "Qtd_Estoque";
pub const COL_UNITS_SOLD: &str = "Vendas_Realizadas";
pub const COL_LAST_ACTION: &str = "Data_Ultima_Acao";

pub const COL_DATE: &str = "Data";
pub const COL_SALE: &str = "Venda";
pub const COL_PROFIT: &str = "Lucro";

/// Column order of the inventory sheet.
pub const INVENTORY_SCHEMA: &[&str] = &[
    COL_ID,
    COL_PRODUCT,
    COL_COST,
    COL_MARGIN,
    COL_SUGGESTED_PRICE,
    COL_SALE_PRICE,
    COL_STOCK,
    COL_UNITS_SOLD,
    COL_LAST_ACTION,
];

/// Column order of the sales sheet.
pub const SALES_SCHEMA: &[&str] = &[COL_DATE, COL_PRODUCT, COL_COST, COL_SALE, COL_PROFIT];

/// Default localized timestamp pattern of the `Data` column.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Default offset of the `Data` column (UTC−03:00), in minutes.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

// =============================================================================
// Cells, Rows, Tables
// =============================================================================

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A row keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<CellValue>) {
        self.0.insert(column.to_string(), value.into());
    }

    /// The cell under `column`, or `Empty` when the column is absent.
    pub fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A whole worksheet: header plus ordered rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// An empty table typed by `schema`.
    ///
    /// ```rust
    /// use stockbook_core::table::{Table, SALES_SCHEMA};
    ///
    /// let table = Table::empty(SALES_SCHEMA);
    /// assert_eq!(table.columns, vec!["Data", "Produto", "Custo", "Venda", "Lucro"]);
    /// assert!(table.rows.is_empty());
    /// ```
    pub fn empty(schema: &[&str]) -> Self {
        Table {
            columns: schema.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fails with `MalformedRow` (row 0) if a required column is missing.
    fn require_columns(&self, required: &[&str]) -> CoreResult<()> {
        // A header-less empty sheet is an empty table, not a broken one
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(());
        }
        match required.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(CoreError::malformed(0, *missing, "column is missing")),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Sheet Format
// =============================================================================

/// How timestamps are rendered in the sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFormat {
    date_format: String,
    utc_offset: FixedOffset,
}

impl SheetFormat {
    /// Creates a format from a strftime pattern and an offset in minutes
    /// (negative is west of UTC).
    pub fn new(date_format: impl Into<String>, utc_offset_minutes: i32) -> Result<Self, ValidationError> {
        let date_format = date_format.into();
        validate_date_format(&date_format)?;

        let utc_offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "utc offset minutes".to_string(),
                min: -1439,
                max: 1439,
            }
        })?;

        Ok(SheetFormat {
            date_format,
            utc_offset,
        })
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Renders a timestamp as local wall-clock text.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.utc_offset)
            .format(&self.date_format)
            .to_string()
    }

    /// Parses local wall-clock text back into UTC.
    ///
    /// Falls back to a date-only reading of the pattern (midnight) and to
    /// RFC 3339, which older exports used.
    pub fn parse_timestamp(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();

        let naive = NaiveDateTime::parse_from_str(text, &self.date_format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.date_format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });

        match naive {
            Some(naive) => self
                .utc_offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            None => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl Default for SheetFormat {
    fn default() -> Self {
        SheetFormat {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

// =============================================================================
// Cell Readers
// =============================================================================

fn read_text(row: &Row, index: usize, column: &str) -> CoreResult<String> {
    match row.get(column) {
        CellValue::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        CellValue::Integer(i) => Ok(i.to_string()),
        CellValue::Number(f) => Ok(f.to_string()),
        _ => Err(CoreError::malformed(index, column, "value is required")),
    }
}

/// Reads an amount cell, rejecting values too large to total.
fn read_money(row: &Row, index: usize, column: &str) -> CoreResult<Money> {
    let amount = read_money_cell(row, index, column)?;
    validate_amount_bound(column, amount)
        .map_err(|e| CoreError::malformed(index, column, e.to_string()))?;
    Ok(amount)
}

fn read_money_cell(row: &Row, index: usize, column: &str) -> CoreResult<Money> {
    match row.get(column) {
        CellValue::Integer(i) => Ok(Money::from_cents(i.saturating_mul(100))),
        CellValue::Number(f) => Money::from_major_f64(*f)
            .ok_or_else(|| CoreError::malformed(index, column, "not a finite number")),
        CellValue::Text(s) if !s.trim().is_empty() => {
            let s = s.trim();
            let s = s.strip_prefix("R$").unwrap_or(s);
            s.parse::<Money>()
                .map_err(|e| CoreError::malformed(index, column, e.to_string()))
        }
        _ => Err(CoreError::malformed(index, column, "value is required")),
    }
}

fn read_margin(row: &Row, index: usize, column: &str) -> CoreResult<Margin> {
    match row.get(column) {
        CellValue::Integer(i) => Ok(Margin::from_bps(i.saturating_mul(100))),
        CellValue::Number(f) if f.is_finite() => Ok(Margin::from_percentage(*f)),
        CellValue::Text(s) if !s.trim().is_empty() => s
            .parse::<Margin>()
            .map_err(|e| CoreError::malformed(index, column, e.to_string())),
        CellValue::Empty => Ok(Margin::zero()),
        _ => Err(CoreError::malformed(index, column, "not a percentage")),
    }
}

fn read_count(row: &Row, index: usize, column: &str) -> CoreResult<u32> {
    let bad = |reason: &str| CoreError::malformed(index, column, reason);

    match row.get(column) {
        CellValue::Integer(i) => u32::try_from(*i).map_err(|_| bad("must be a non-negative count")),
        CellValue::Number(f) => {
            if f.fract() != 0.0 || *f < 0.0 || *f > u32::MAX as f64 {
                Err(bad("must be a non-negative whole number"))
            } else {
                Ok(*f as u32)
            }
        }
        CellValue::Text(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<u32>()
            .map_err(|_| bad("must be a non-negative whole number")),
        _ => Ok(0),
    }
}

fn read_timestamp(
    row: &Row,
    index: usize,
    column: &str,
    format: &SheetFormat,
) -> CoreResult<Option<DateTime<Utc>>> {
    match row.get(column) {
        CellValue::Text(s) if !s.trim().is_empty() => format
            .parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| CoreError::malformed(index, column, format!("'{}' is not a date", s))),
        CellValue::Empty => Ok(None),
        CellValue::Text(_) => Ok(None),
        _ => Err(CoreError::malformed(index, column, "expected date text")),
    }
}

// =============================================================================
// Inventory Codec
// =============================================================================

/// Encodes the ledger as an inventory sheet.
pub fn ledger_to_table(ledger: &InventoryLedger, format: &SheetFormat) -> Table {
    let mut table = Table::empty(INVENTORY_SCHEMA);

    for p in ledger.products() {
        let last_action = match p.last_action_at {
            Some(ts) => CellValue::Text(format.format_timestamp(ts)),
            None => CellValue::Empty,
        };

        table.push(
            Row::new()
                .with(COL_ID, p.id.as_str())
                .with(COL_PRODUCT, p.name.as_str())
                .with(COL_COST, p.unit_cost.to_major_f64())
                .with(COL_MARGIN, p.margin.percentage())
                .with(COL_SUGGESTED_PRICE, p.suggested_price.to_major_f64())
                .with(COL_SALE_PRICE, p.sale_price.to_major_f64())
                .with(COL_STOCK, p.stock_qty as i64)
                .with(COL_UNITS_SOLD, p.units_sold as i64)
                .with(COL_LAST_ACTION, last_action),
        );
    }

    table
}

/// Decodes an inventory sheet.
pub fn ledger_from_table(table: &Table, format: &SheetFormat) -> CoreResult<InventoryLedger> {
    table.require_columns(&[COL_PRODUCT, COL_COST, COL_SALE_PRICE, COL_STOCK])?;

    let mut records = Vec::with_capacity(table.len());
    for (index, row) in table.rows.iter().enumerate() {
        let unit_cost = read_money(row, index, COL_COST)?;
        let margin = read_margin(row, index, COL_MARGIN)?;

        let name = read_text(row, index, COL_PRODUCT)?;
        let id = match row.get(COL_ID) {
            CellValue::Text(s) if !s.trim().is_empty() => ProductId::from_string(s.trim()),
            _ => ProductId::for_legacy_row(index, &name),
        };

        let suggested_price = if row.get(COL_SUGGESTED_PRICE).is_empty() {
            margin.apply_markup(unit_cost)
        } else {
            read_money(row, index, COL_SUGGESTED_PRICE)?
        };

        records.push(ProductRecord {
            id,
            name,
            unit_cost,
            margin,
            suggested_price,
            sale_price: read_money(row, index, COL_SALE_PRICE)?,
            stock_qty: read_count(row, index, COL_STOCK)?,
            units_sold: read_count(row, index, COL_UNITS_SOLD)?,
            last_action_at: read_timestamp(row, index, COL_LAST_ACTION, format)?,
        });
    }

    Ok(InventoryLedger::from_records(records))
}

// =============================================================================
// Sales Codec
// =============================================================================

/// Encodes the journal as a sales sheet, oldest first.
pub fn journal_to_table(journal: &SalesJournal, format: &SheetFormat) -> Table {
    let mut table = Table::empty(SALES_SCHEMA);

    for e in journal.events() {
        table.push(
            Row::new()
                .with(COL_DATE, format.format_timestamp(e.timestamp))
                .with(COL_PRODUCT, e.product_name.as_str())
                .with(COL_COST, e.unit_cost.to_major_f64())
                .with(COL_SALE, e.sale_price.to_major_f64())
                .with(COL_PROFIT, e.profit.to_major_f64()),
        );
    }

    table
}

/// Decodes a sales sheet, keeping row order.
///
/// A stored `Lucro` is kept as written; an empty one is recomputed.
pub fn journal_from_table(table: &Table, format: &SheetFormat) -> CoreResult<SalesJournal> {
    table.require_columns(&[COL_DATE, COL_PRODUCT, COL_COST, COL_SALE])?;

    let mut events = Vec::with_capacity(table.len());
    for (index, row) in table.rows.iter().enumerate() {
        let timestamp = read_timestamp(row, index, COL_DATE, format)?
            .ok_or_else(|| CoreError::malformed(index, COL_DATE, "value is required"))?;
        let unit_cost = read_money(row, index, COL_COST)?;
        let sale_price = read_money(row, index, COL_SALE)?;

        let profit = if row.get(COL_PROFIT).is_empty() {
            sale_price - unit_cost
        } else {
            read_money(row, index, COL_PROFIT)?
        };

        events.push(SaleEvent {
            timestamp,
            product_name: read_text(row, index, COL_PRODUCT)?,
            unit_cost,
            sale_price,
            profit,
        });
    }

    Ok(SalesJournal::from_events(events))
}
