//! # Sales Journal
//!
//! Append-only record of completed sales. Insertion order is chronological
//! order; the only way to drop events is the bulk `remove_where` used by the
//! management view.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::SaleEvent;

/// Aggregate metrics over the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JournalSummary {
    /// `Σ sale_price`.
    pub revenue_total: Money,
    /// `Σ profit`.
    pub profit_total: Money,
    /// `revenue_total / count`, zero for an empty journal.
    pub avg_ticket: Money,
    /// Number of sale events.
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesJournal {
    events: Vec<SaleEvent>,
}

impl SalesJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a journal from events loaded from storage, keeping their order.
    pub fn from_events(events: Vec<SaleEvent>) -> Self {
        SalesJournal { events }
    }

    /// Appends an event at the end.
    pub fn append(&mut self, event: SaleEvent) {
        self.events.push(event);
    }

    /// Revenue, profit, average ticket, and count.
    ///
    /// ```rust
    /// use stockbook_core::SalesJournal;
    ///
    /// let summary = SalesJournal::new().aggregate();
    /// assert_eq!(summary.count, 0);
    /// assert!(summary.avg_ticket.is_zero());
    /// ```
    pub fn aggregate(&self) -> JournalSummary {
        let revenue_total = self
            .events
            .iter()
            .fold(Money::zero(), |acc, e| acc.saturating_add(e.sale_price));
        let profit_total = self
            .events
            .iter()
            .fold(Money::zero(), |acc, e| acc.saturating_add(e.profit));
        let count = self.events.len();

        JournalSummary {
            revenue_total,
            profit_total,
            avg_ticket: revenue_total.average_over(count),
            count,
        }
    }

    /// Drops every event matching `predicate`; survivors keep their relative
    /// order. Returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&SaleEvent) -> bool,
    {
        let before = self.events.len();
        self.events.retain(|e| !predicate(e));
        before - self.events.len()
    }

    /// Newest first, for display. Stored order is untouched.
    pub fn list_descending(&self) -> impl Iterator<Item = &SaleEvent> + '_ {
        self.events.iter().rev()
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<SaleEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn event(name: &str, cost: i64, price: i64, minute: i64) -> SaleEvent {
        SaleEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Duration::minutes(minute),
            product_name: name.to_string(),
            unit_cost: Money::from_cents(cost),
            sale_price: Money::from_cents(price),
            profit: Money::from_cents(price - cost),
        }
    }

    fn journal() -> SalesJournal {
        let mut journal = SalesJournal::new();
        journal.append(event("Widget", 1000, 1500, 0));
        journal.append(event("Mug", 2000, 2500, 1));
        journal.append(event("Widget", 1000, 1500, 2));
        journal
    }

    #[test]
    fn test_aggregate() {
        let summary = journal().aggregate();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.revenue_total.cents(), 5500);
        assert_eq!(summary.profit_total.cents(), 1500);
        assert_eq!(summary.avg_ticket.cents(), 1833);
    }

    #[test]
    fn test_empty_average_ticket_is_zero() {
        let summary = SalesJournal::new().aggregate();
        assert_eq!(summary, JournalSummary::default());
    }

    #[test]
    fn test_append_keeps_order() {
        let journal = journal();
        let names: Vec<_> = journal.events().iter().map(|e| e.product_name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "Mug", "Widget"]);
    }

    #[test]
    fn test_list_descending_does_not_mutate() {
        let journal = journal();
        let newest: Vec<_> = journal.list_descending().map(|e| e.timestamp).collect();
        assert!(newest.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(journal.events()[0].product_name, "Widget");
        assert_eq!(journal.events()[1].product_name, "Mug");
    }

    #[test]
    fn test_remove_where_keeps_relative_order() {
        let mut journal = journal();
        journal.append(event("Cap", 300, 900, 3));

        let removed = journal.remove_where(|e| e.product_name == "Widget");
        assert_eq!(removed, 2);

        let names: Vec<_> = journal.events().iter().map(|e| e.product_name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Cap"]);
        assert_eq!(journal.remove_where(|_| false), 0);
    }
}
