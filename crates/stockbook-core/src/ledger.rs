//! # Inventory Ledger
//!
//! The live set of product records with their stock and price state.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       InventoryLedger                                   │
//! │                                                                         │
//! │  add_product(NewProduct) ──► validate ──► price ──► push record        │
//! │                                                                         │
//! │  sell(name) ──► first match ──► stock > 0 ? ──┬── yes: stock −1,        │
//! │                                               │        sold  +1,        │
//! │                                               │        SaleEvent        │
//! │                                               └── no:  InsufficientStock│
//! │                                                        (no mutation)    │
//! │                                                                         │
//! │  remove_product(name) ──► drop EVERY record with that name             │
//! │                                                                         │
//! │  aggregate() ──► LedgerSummary                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Break-Even Framing
//! `investment_total` counts the cost of every unit ever acquired, sold or
//! not, so `balance = revenue_total - investment_total` reads as the cash
//! position: money spent on stock versus money recovered from sales. It is
//! not an inventory valuation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{NewProduct, ProductId, ProductRecord, SaleEvent};
use crate::validation::{
    validate_product_name, validate_quantity, validate_sale_price, validate_unit_cost,
};

/// Aggregate metrics over the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    /// Units on hand across all products.
    pub stock_total: u64,
    /// `Σ unit_cost × (stock_qty + units_sold)`.
    pub investment_total: Money,
    /// `Σ sale_price × units_sold`.
    pub revenue_total: Money,
    /// `Σ (sale_price − unit_cost) × units_sold`.
    pub gross_profit_total: Money,
    /// `revenue_total − investment_total`.
    pub balance: Money,
}

/// Product records in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLedger {
    products: Vec<ProductRecord>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from records loaded from storage.
    pub fn from_records(products: Vec<ProductRecord>) -> Self {
        InventoryLedger { products }
    }

    /// Registers a new product.
    ///
    /// ## Pricing
    /// - `ByMargin(m)`: `sale_price = unit_cost × (1 + m/100)`
    /// - `ByPrice(p)`: `margin = (p − unit_cost) / p × 100`, 0 when `p <= 0`
    ///
    /// ## Errors
    /// A `ValidationError` for an empty name, a negative cost, an oversized
    /// quantity, or a resulting `sale_price <= 0`. The ledger is untouched.
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use stockbook_core::money::{Margin, Money};
    /// use stockbook_core::{InventoryLedger, NewProduct, PricingMode};
    ///
    /// let mut ledger = InventoryLedger::new();
    /// let product = ledger
    ///     .add_product(
    ///         NewProduct::new("Widget", Money::from_cents(1000), 1, PricingMode::ByMargin(Margin::from_bps(5000))),
    ///         Utc::now(),
    ///     )
    ///     .unwrap();
    /// assert_eq!(product.sale_price.cents(), 1500);
    /// ```
    pub fn add_product(&mut self, input: NewProduct, now: DateTime<Utc>) -> CoreResult<ProductRecord> {
        validate_product_name(&input.name)?;
        validate_unit_cost(input.unit_cost)?;
        validate_quantity(input.quantity)?;

        let (margin, sale_price) = input.pricing.resolve(input.unit_cost);
        validate_sale_price(sale_price)?;

        let record = ProductRecord {
            id: ProductId::generate(),
            name: input.name.trim().to_string(),
            unit_cost: input.unit_cost,
            margin,
            suggested_price: margin.apply_markup(input.unit_cost),
            sale_price,
            stock_qty: input.quantity,
            units_sold: 0,
            last_action_at: Some(now),
        };

        self.products.push(record.clone());
        Ok(record)
    }

    /// Removes every record whose name matches; returns how many went.
    pub fn remove_product(&mut self, name: &str) -> usize {
        let before = self.products.len();
        self.products.retain(|p| p.name != name);
        before - self.products.len()
    }

    /// Removes the record with the given stable id.
    pub fn remove_by_id(&mut self, id: &ProductId) -> Option<ProductRecord> {
        let index = self.products.iter().position(|p| &p.id == id)?;
        Some(self.products.remove(index))
    }

    /// Sells one unit of the first product with a matching name.
    ///
    /// ## Errors
    /// - `ProductNotFound` when no record has that name
    /// - `InsufficientStock` when its stock is zero (nothing mutated)
    pub fn sell(&mut self, name: &str, now: DateTime<Utc>) -> CoreResult<SaleEvent> {
        let index = self
            .products
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))?;
        self.sell_at(index, now)
    }

    /// Sells one unit of the product with the given stable id.
    pub fn sell_by_id(&mut self, id: &ProductId, now: DateTime<Utc>) -> CoreResult<SaleEvent> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        self.sell_at(index, now)
    }

    fn sell_at(&mut self, index: usize, now: DateTime<Utc>) -> CoreResult<SaleEvent> {
        let product = &mut self.products[index];

        if product.stock_qty == 0 {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: 0,
            });
        }

        product.stock_qty -= 1;
        product.units_sold += 1;
        product.last_action_at = Some(now);

        Ok(SaleEvent::snapshot(product, now))
    }

    /// Computes the dashboard metrics.
    pub fn aggregate(&self) -> LedgerSummary {
        let mut summary = LedgerSummary::default();

        for p in &self.products {
            let sold = p.units_sold as i64;
            summary.stock_total += p.stock_qty as u64;
            let acquired = i64::try_from(p.units_acquired()).unwrap_or(i64::MAX);
            summary.investment_total = summary
                .investment_total
                .saturating_add(p.unit_cost.saturating_mul(acquired));
            summary.revenue_total = summary.revenue_total.saturating_add(p.sale_price.saturating_mul(sold));
            summary.gross_profit_total = summary
                .gross_profit_total
                .saturating_add(p.unit_profit().saturating_mul(sold));
        }

        summary.balance = summary.revenue_total.saturating_sub(summary.investment_total);
        summary
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    /// First record with the given name.
    pub fn find(&self, name: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn get(&self, id: &ProductId) -> Option<&ProductRecord> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Distinct names in first-seen order, for selection lists.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for p in &self.products {
            if !names.contains(&p.name.as_str()) {
                names.push(&p.name);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Margin;
    use crate::types::PricingMode;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    fn by_margin(name: &str, cost: i64, qty: u32, bps: i64) -> NewProduct {
        NewProduct::new(name, Money::from_cents(cost), qty, PricingMode::ByMargin(Margin::from_bps(bps)))
    }

    #[test]
    fn test_widget_scenario() {
        let mut ledger = InventoryLedger::new();
        let product = ledger.add_product(by_margin("Widget", 1000, 1, 5000), now()).unwrap();
        assert_eq!(product.sale_price.cents(), 1500);
        assert_eq!(product.margin.bps(), 5000);
        assert_eq!(product.suggested_price.cents(), 1500);

        let event = ledger.sell("Widget", now()).unwrap();
        assert_eq!(event.profit.cents(), 500);

        let widget = ledger.find("Widget").unwrap();
        assert_eq!(widget.stock_qty, 0);
        assert_eq!(widget.units_sold, 1);

        let summary = ledger.aggregate();
        assert_eq!(summary.investment_total.cents(), 1000);
        assert_eq!(summary.revenue_total.cents(), 1500);
        assert_eq!(summary.gross_profit_total.cents(), 500);
        assert_eq!(summary.balance.cents(), 500);
        assert_eq!(summary.stock_total, 0);
    }

    #[test]
    fn test_manual_price_derives_margin() {
        let mut ledger = InventoryLedger::new();
        let product = ledger
            .add_product(
                NewProduct::new("Mug", Money::from_cents(2000), 4, PricingMode::ByPrice(Money::from_cents(2500))),
                now(),
            )
            .unwrap();
        assert_eq!(product.margin.bps(), 2000);
        assert_eq!(product.sale_price.cents(), 2500);
        assert_eq!(product.suggested_price.cents(), 2400);
    }

    #[test]
    fn test_add_increases_investment_only() {
        let mut ledger = InventoryLedger::new();
        ledger.add_product(by_margin("A", 700, 3, 3000), now()).unwrap();
        ledger.sell("A", now()).unwrap();
        let before = ledger.aggregate();

        ledger.add_product(by_margin("B", 1250, 4, 2000), now()).unwrap();
        let after = ledger.aggregate();

        assert_eq!((after.investment_total - before.investment_total).cents(), 1250 * 4);
        assert_eq!(after.revenue_total, before.revenue_total);
        assert_eq!(after.stock_total, before.stock_total + 4);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut ledger = InventoryLedger::new();

        let err = ledger.add_product(by_margin("  ", 1000, 1, 5000), now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // Zero cost with any margin prices at zero
        let err = ledger.add_product(by_margin("Free", 0, 1, 5000), now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = ledger
            .add_product(
                NewProduct::new("Gift", Money::from_cents(100), 1, PricingMode::ByPrice(Money::zero())),
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = ledger.add_product(by_margin("Neg", -100, 1, 5000), now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_trims_name() {
        let mut ledger = InventoryLedger::new();
        let product = ledger.add_product(by_margin("  Widget ", 1000, 1, 5000), now()).unwrap();
        assert_eq!(product.name, "Widget");
    }

    #[test]
    fn test_sell_out_of_stock_is_noop() {
        let mut ledger = InventoryLedger::new();
        ledger.add_product(by_margin("Widget", 1000, 0, 5000), now()).unwrap();
        let snapshot = ledger.clone();

        let err = ledger.sell("Widget", now()).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 0, .. }));
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn test_sell_unknown_product() {
        let mut ledger = InventoryLedger::new();
        let err = ledger.sell("Ghost", now()).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(name) if name == "Ghost"));
    }

    #[test]
    fn test_sell_uses_first_match() {
        let mut ledger = InventoryLedger::new();
        let first = ledger.add_product(by_margin("Dup", 1000, 1, 5000), now()).unwrap();
        let second = ledger.add_product(by_margin("Dup", 2000, 5, 5000), now()).unwrap();

        ledger.sell("Dup", now()).unwrap();
        assert_eq!(ledger.get(&first.id).unwrap().stock_qty, 0);
        assert_eq!(ledger.get(&second.id).unwrap().stock_qty, 5);

        // First match is out of stock: rejected even though a later row has stock
        assert!(ledger.sell("Dup", now()).is_err());

        // Stable ids reach the second record
        let event = ledger.sell_by_id(&second.id, now()).unwrap();
        assert_eq!(event.unit_cost.cents(), 2000);
        assert_eq!(ledger.get(&second.id).unwrap().stock_qty, 4);
    }

    #[test]
    fn test_sell_decrements_and_stamps() {
        let mut ledger = InventoryLedger::new();
        ledger.add_product(by_margin("Widget", 1000, 3, 5000), now()).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap();

        let event = ledger.sell("Widget", later).unwrap();
        let widget = ledger.find("Widget").unwrap();

        assert_eq!(widget.stock_qty, 2);
        assert_eq!(widget.units_sold, 1);
        assert_eq!(widget.last_action_at, Some(later));
        assert_eq!(event.profit, widget.sale_price - widget.unit_cost);
        assert_eq!(event.timestamp, later);
    }

    #[test]
    fn test_remove_product_removes_all_matches() {
        let mut ledger = InventoryLedger::new();
        ledger.add_product(by_margin("Dup", 1000, 1, 5000), now()).unwrap();
        ledger.add_product(by_margin("Keep", 1000, 1, 5000), now()).unwrap();
        ledger.add_product(by_margin("Dup", 1000, 1, 5000), now()).unwrap();

        assert_eq!(ledger.remove_product("Dup"), 2);
        assert_eq!(ledger.names(), vec!["Keep"]);
        assert_eq!(ledger.remove_product("Dup"), 0);
    }

    #[test]
    fn test_remove_by_id() {
        let mut ledger = InventoryLedger::new();
        let a = ledger.add_product(by_margin("Dup", 1000, 1, 5000), now()).unwrap();
        ledger.add_product(by_margin("Dup", 1000, 1, 5000), now()).unwrap();

        let removed = ledger.remove_by_id(&a.id).unwrap();
        assert_eq!(removed.id, a.id);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.remove_by_id(&a.id).is_none());
    }

    #[test]
    fn test_names_are_distinct() {
        let mut ledger = InventoryLedger::new();
        for name in ["B", "A", "B", "C"] {
            ledger.add_product(by_margin(name, 100, 1, 1000), now()).unwrap();
        }
        assert_eq!(ledger.names(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_amount_above_limit_is_rejected() {
        let mut ledger = InventoryLedger::new();
        let err = ledger
            .add_product(by_margin("Yacht", crate::MAX_AMOUNT_CENTS + 1, 1, 0), now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // A markup that pushes the price over the limit is caught too
        assert!(ledger
            .add_product(by_margin("Yacht", crate::MAX_AMOUNT_CENTS, 1, 5000), now())
            .is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_aggregate_saturates_instead_of_overflowing() {
        let mut ledger = InventoryLedger::new();
        for name in ["A", "B", "C"] {
            ledger
                .add_product(
                    by_margin(name, crate::MAX_AMOUNT_CENTS, crate::MAX_STOCK_QUANTITY, 0),
                    now(),
                )
                .unwrap();
        }

        let summary = ledger.aggregate();
        assert_eq!(summary.investment_total.cents(), i64::MAX);
        assert_eq!(summary.balance.cents(), -i64::MAX);
        assert_eq!(summary.stock_total, 3 * crate::MAX_STOCK_QUANTITY as u64);
    }

    #[test]
    fn test_empty_ledger_aggregate() {
        assert_eq!(InventoryLedger::new().aggregate(), LedgerSummary::default());
    }
}
