//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   sell()   ┌─────────────────┐                    │
//! │  │  ProductRecord  │ ─────────► │    SaleEvent    │                    │
//! │  │  ─────────────  │  snapshot  │  ─────────────  │                    │
//! │  │  id (UUID)      │            │  timestamp      │                    │
//! │  │  name (business)│            │  product_name   │                    │
//! │  │  unit_cost      │            │  unit_cost      │                    │
//! │  │  margin         │            │  sale_price     │                    │
//! │  │  sale_price     │            │  profit         │                    │
//! │  │  stock_qty      │            └─────────────────┘                    │
//! │  │  units_sold     │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! Every product has:
//! - `id`: UUID v4 assigned at creation, never reused
//! - `name`: human-readable, used by the dashboards as a de-facto key and
//!   allowed to collide

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{Margin, Money};

// =============================================================================
// Product Id
// =============================================================================

/// Stable product identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ProductId(String);

impl ProductId {
    /// Generates a fresh id.
    pub fn generate() -> Self {
        ProductId(Uuid::new_v4().to_string())
    }

    /// Derives the id of a stored row that has no `Id` cell.
    ///
    /// Deterministic in the row position and name, so every read of an
    /// unchanged sheet agrees until a save writes the id out.
    pub fn for_legacy_row(position: usize, name: &str) -> Self {
        let key = format!("stockbook:{position}:{name}");
        ProductId(Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string())
    }

    /// Wraps an id read back from storage.
    pub fn from_string(id: impl Into<String>) -> Self {
        ProductId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Pricing Mode
// =============================================================================

/// How the operator priced a new product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum PricingMode {
    /// Margin entered; price derived as a markup on cost.
    ByMargin(Margin),
    /// Price entered; margin derived as a share of price.
    ByPrice(Money),
}

impl PricingMode {
    /// Resolves the mode into `(margin, sale_price)` for a given cost.
    ///
    /// ```rust
    /// use stockbook_core::money::{Margin, Money};
    /// use stockbook_core::PricingMode;
    ///
    /// let (margin, price) = PricingMode::ByMargin(Margin::from_bps(5000))
    ///     .resolve(Money::from_cents(1000));
    /// assert_eq!((margin.bps(), price.cents()), (5000, 1500));
    ///
    /// let (margin, price) = PricingMode::ByPrice(Money::from_cents(2500))
    ///     .resolve(Money::from_cents(2000));
    /// assert_eq!((margin.bps(), price.cents()), (2000, 2500));
    /// ```
    pub fn resolve(&self, unit_cost: Money) -> (Margin, Money) {
        match *self {
            PricingMode::ByMargin(margin) => (margin, margin.apply_markup(unit_cost)),
            PricingMode::ByPrice(price) => (Margin::from_prices(unit_cost, price), price),
        }
    }
}

// =============================================================================
// New Product (add-product form input)
// =============================================================================

/// Input of the add-product action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub unit_cost: Money,
    pub quantity: u32,
    pub pricing: PricingMode,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, unit_cost: Money, quantity: u32, pricing: PricingMode) -> Self {
        NewProduct {
            name: name.into(),
            unit_cost,
            quantity,
            pricing,
        }
    }
}

// =============================================================================
// Product Record
// =============================================================================

/// A product held in the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRecord {
    /// Stable identifier assigned at creation.
    pub id: ProductId,

    /// Display name; not guaranteed unique.
    pub name: String,

    /// Acquisition cost per unit.
    pub unit_cost: Money,

    /// Margin entered or derived at registration.
    pub margin: Margin,

    /// `unit_cost * (1 + margin/100)`.
    pub suggested_price: Money,

    /// Price charged per unit.
    pub sale_price: Money,

    /// Units on hand. Never negative.
    pub stock_qty: u32,

    /// Units sold so far.
    pub units_sold: u32,

    /// Last add or sell on this record.
    #[ts(as = "Option<String>")]
    pub last_action_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// Profit on one unit at the current price.
    #[inline]
    pub fn unit_profit(&self) -> Money {
        self.sale_price - self.unit_cost
    }

    /// Units ever acquired: on hand plus sold.
    #[inline]
    pub fn units_acquired(&self) -> u64 {
        self.stock_qty as u64 + self.units_sold as u64
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_qty > 0
    }
}

// =============================================================================
// Sale Event
// =============================================================================

/// One completed sale.
///
/// Uses the snapshot pattern: cost and price are copied from the product at
/// sale time, so later edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleEvent {
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit cost at time of sale (frozen).
    pub unit_cost: Money,
    /// Sale price at time of sale (frozen).
    pub sale_price: Money,
    /// `sale_price - unit_cost`, computed once.
    pub profit: Money,
}

impl SaleEvent {
    /// Snapshots a product at sale time.
    pub fn snapshot(product: &ProductRecord, timestamp: DateTime<Utc>) -> Self {
        SaleEvent {
            timestamp,
            product_name: product.name.clone(),
            unit_cost: product.unit_cost,
            sale_price: product.sale_price,
            profit: product.sale_price - product.unit_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn widget() -> ProductRecord {
        ProductRecord {
            id: ProductId::generate(),
            name: "Widget".to_string(),
            unit_cost: Money::from_cents(1000),
            margin: Margin::from_bps(5000),
            suggested_price: Money::from_cents(1500),
            sale_price: Money::from_cents(1500),
            stock_qty: 2,
            units_sold: 3,
            last_action_at: None,
        }
    }

    #[test]
    fn test_product_id_is_unique() {
        let a = ProductId::generate();
        let b = ProductId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_pricing_by_price_with_zero_price() {
        let (margin, price) = PricingMode::ByPrice(Money::zero()).resolve(Money::from_cents(500));
        assert_eq!(margin, Margin::zero());
        assert_eq!(price, Money::zero());
    }

    #[test]
    fn test_product_helpers() {
        let product = widget();
        assert_eq!(product.unit_profit().cents(), 500);
        assert_eq!(product.units_acquired(), 5);
        assert!(product.in_stock());
    }

    #[test]
    fn test_sale_snapshot_copies_values() {
        let mut product = widget();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = SaleEvent::snapshot(&product, at);

        product.sale_price = Money::from_cents(9999);

        assert_eq!(event.sale_price.cents(), 1500);
        assert_eq!(event.profit.cents(), 500);
        assert_eq!(event.timestamp, at);
    }

    #[test]
    fn test_pricing_mode_serde_shape() {
        let json = serde_json::to_string(&PricingMode::ByMargin(Margin::from_bps(3000))).unwrap();
        assert_eq!(json, r#"{"mode":"by_margin","value":3000}"#);
    }
}
