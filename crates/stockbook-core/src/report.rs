//! # Dashboard Report
//!
//! Read-only view combining ledger metrics, journal metrics, progress towards
//! a profit goal, low-stock alerts, and per-product sales totals.
//!
//! The profit goal and the low-stock threshold belong to the caller and are
//! passed in through [`ReportOptions`]; nothing here keeps state between calls.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::journal::{JournalSummary, SalesJournal};
use crate::ledger::{InventoryLedger, LedgerSummary};
use crate::money::Money;

/// Default threshold below which a product is flagged as low on stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;

// =============================================================================
// Profit Goal
// =============================================================================

/// Target gross profit. Zero means no goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitGoal(pub Money);

/// How far the ledger's gross profit is from the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoalProgress {
    pub goal: Money,
    pub achieved: Money,
    /// `goal − achieved`, never below zero.
    pub remaining: Money,
    /// Completion in basis points, capped at 10000 (100%).
    pub percent_bps: i64,
}

impl ProfitGoal {
    /// Measures `achieved` against the goal.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    /// use stockbook_core::report::ProfitGoal;
    ///
    /// let progress = ProfitGoal(Money::from_cents(10_000)).progress(Money::from_cents(2_500));
    /// assert_eq!(progress.percent_bps, 2500);
    /// assert_eq!(progress.remaining.cents(), 7_500);
    /// ```
    pub fn progress(&self, achieved: Money) -> GoalProgress {
        let goal = self.0;
        let remaining = if achieved >= goal {
            Money::zero()
        } else {
            goal.saturating_sub(achieved)
        };

        GoalProgress {
            goal,
            achieved,
            remaining,
            percent_bps: achieved.ratio_bps(goal).clamp(0, 10_000),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Caller-owned report settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub profit_goal: ProfitGoal,
    pub low_stock_threshold: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            profit_goal: ProfitGoal::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// A product whose stock is below the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockItem {
    pub product_name: String,
    pub stock_qty: u32,
}

/// Journal totals for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub product_name: String,
    pub units: u32,
    pub revenue: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardReport {
    pub ledger: LedgerSummary,
    pub journal: JournalSummary,
    pub goal: GoalProgress,
    pub low_stock: Vec<LowStockItem>,
    /// Ordered by revenue, highest first; ties by name.
    pub sales_by_product: Vec<ProductSales>,
}

impl DashboardReport {
    pub fn build(ledger: &InventoryLedger, journal: &SalesJournal, options: &ReportOptions) -> Self {
        let ledger_summary = ledger.aggregate();

        let low_stock = ledger
            .products()
            .iter()
            .filter(|p| p.stock_qty < options.low_stock_threshold)
            .map(|p| LowStockItem {
                product_name: p.name.clone(),
                stock_qty: p.stock_qty,
            })
            .collect();

        DashboardReport {
            ledger: ledger_summary,
            journal: journal.aggregate(),
            goal: options.profit_goal.progress(ledger_summary.gross_profit_total),
            low_stock,
            sales_by_product: sales_by_product(journal),
        }
    }
}

/// Groups journal events by product name.
pub fn sales_by_product(journal: &SalesJournal) -> Vec<ProductSales> {
    let mut totals: HashMap<&str, ProductSales> = HashMap::new();

    for event in journal.events() {
        let entry = totals
            .entry(event.product_name.as_str())
            .or_insert_with(|| ProductSales {
                product_name: event.product_name.clone(),
                units: 0,
                revenue: Money::zero(),
                profit: Money::zero(),
            });
        entry.units += 1;
        entry.revenue = entry.revenue.saturating_add(event.sale_price);
        entry.profit = entry.profit.saturating_add(event.profit);
    }

    let mut rows: Vec<ProductSales> = totals.into_values().collect();
    rows.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Margin;
    use crate::types::{NewProduct, PricingMode};
    use chrono::Utc;

    fn setup() -> (InventoryLedger, SalesJournal) {
        let mut ledger = InventoryLedger::new();
        let mut journal = SalesJournal::new();
        let now = Utc::now();

        for (name, cost, qty) in [("Widget", 1000, 5), ("Mug", 2000, 1), ("Cap", 500, 10)] {
            ledger
                .add_product(
                    NewProduct::new(name, Money::from_cents(cost), qty, PricingMode::ByMargin(Margin::from_bps(5000))),
                    now,
                )
                .unwrap();
        }
        for name in ["Widget", "Widget", "Mug", "Cap"] {
            journal.append(ledger.sell(name, now).unwrap());
        }
        (ledger, journal)
    }

    #[test]
    fn test_goal_progress() {
        let goal = ProfitGoal(Money::from_cents(1000));
        assert_eq!(goal.progress(Money::from_cents(250)).percent_bps, 2500);

        let over = goal.progress(Money::from_cents(5000));
        assert_eq!(over.percent_bps, 10_000);
        assert!(over.remaining.is_zero());

        let losing = goal.progress(Money::from_cents(-300));
        assert_eq!(losing.percent_bps, 0);
        assert_eq!(losing.remaining.cents(), 1300);

        let none = ProfitGoal::default().progress(Money::from_cents(500));
        assert_eq!(none.percent_bps, 0);
        assert!(none.remaining.is_zero());
    }

    #[test]
    fn test_sales_by_product_ordering() {
        let (_, journal) = setup();
        let rows = sales_by_product(&journal);

        let names: Vec<_> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Widget", "Cap"]);
        assert_eq!(rows[1].units, 2);
        assert_eq!(rows[1].revenue.cents(), 3000);
        assert_eq!(rows[1].profit.cents(), 1000);
    }

    #[test]
    fn test_dashboard_report() {
        let (ledger, journal) = setup();
        let options = ReportOptions {
            profit_goal: ProfitGoal(Money::from_cents(4000)),
            low_stock_threshold: 3,
        };

        let report = DashboardReport::build(&ledger, &journal, &options);

        // Widget 500 + 500, Mug 1000, Cap 250
        assert_eq!(report.ledger.gross_profit_total.cents(), 2250);
        assert_eq!(report.journal.profit_total.cents(), 2250);
        assert_eq!(report.goal.remaining.cents(), 1750);

        let low: Vec<_> = report.low_stock.iter().map(|l| l.product_name.as_str()).collect();
        assert_eq!(low, vec!["Mug"]);
    }
}
