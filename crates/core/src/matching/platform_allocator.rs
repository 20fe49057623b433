use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ledger::{Platform, Purchase, Sale, TransactionId};
use crate::valuation::ValuationCalculator;

use super::fifo_matcher::FifoMatcher;

/// Attribution of one purchase's stock to the platforms that sold it.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseAllocation {
    pub purchase_id: TransactionId,
    pub consumed_by_platform: HashMap<Platform, u32>,
    pub unconsumed_quantity: u32,
    pub unit_cost: Decimal,
}

impl PurchaseAllocation {
    pub fn consumed_by(&self, platform: Platform) -> u32 {
        self.consumed_by_platform
            .get(&platform)
            .copied()
            .unwrap_or(0)
    }

    /// The purchase's share under one platform's view: units that platform
    /// actually sold, plus units not yet sold to anyone. Unsold stock counts
    /// toward every platform's view until a sale claims it.
    pub fn effective_quantity(&self, platform: Platform) -> u32 {
        self.consumed_by(platform) + self.unconsumed_quantity
    }

    pub fn effective_expense(&self, platform: Platform) -> Decimal {
        Decimal::from(self.effective_quantity(platform)) * self.unit_cost
    }
}

/// Derives platform attribution for purchases, which carry no platform of
/// their own - only sales do. Runs its own FIFO consumption pass over the
/// history; queue state is never shared with profit-matching sweeps.
pub struct PlatformAllocator<'a> {
    valuation: &'a ValuationCalculator<'a>,
}

impl<'a> PlatformAllocator<'a> {
    pub fn new(valuation: &'a ValuationCalculator<'a>) -> Self {
        PlatformAllocator { valuation }
    }

    /// Consumption per purchase across the selected item types, up to
    /// `max_date` when given.
    pub fn allocate(
        &self,
        purchases: &[Purchase],
        sales: &[Sale],
        item_types: &[String],
        max_date: Option<NaiveDate>,
    ) -> BTreeMap<TransactionId, PurchaseAllocation> {
        let selected: HashSet<&str> = item_types.iter().map(String::as_str).collect();

        let mut allocations: BTreeMap<TransactionId, PurchaseAllocation> = purchases
            .iter()
            .filter(|p| selected.contains(p.item_type.as_str()))
            .filter(|p| max_date.map_or(true, |cap| p.date <= cap))
            .map(|p| {
                (
                    p.id,
                    PurchaseAllocation {
                        purchase_id: p.id,
                        consumed_by_platform: HashMap::new(),
                        unconsumed_quantity: p.quantity,
                        unit_cost: self.valuation.purchase_unit_cost(p),
                    },
                )
            })
            .collect();

        let log = FifoMatcher::new(self.valuation).sweep(purchases, sales, item_types, max_date);
        for event in &log.events {
            if let Some(allocation) = allocations.get_mut(&event.purchase_id) {
                *allocation
                    .consumed_by_platform
                    .entry(event.platform)
                    .or_insert(0) += event.quantity;
                allocation.unconsumed_quantity -= event.quantity;
            }
        }

        allocations
    }
}
