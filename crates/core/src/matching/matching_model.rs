//! Matching domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::{Platform, TransactionId};

/// Remaining slice of one purchase inside a FIFO queue.
///
/// `unit_cost` is fixed when the purchase is enqueued, from the valuation at
/// the purchase's own date, and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseChunk {
    pub purchase_id: TransactionId,
    pub remaining_quantity: u32,
    pub unit_cost: Decimal,
}

/// One FIFO allocation: `quantity` units taken from `purchase_id` by
/// `sale_id`. `date` is the sale's date - that is where the cost lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchEvent {
    pub date: NaiveDate,
    pub sale_id: TransactionId,
    pub platform: Platform,
    pub purchase_id: TransactionId,
    pub quantity: u32,
    pub unit_net: Decimal,
    pub unit_cost: Decimal,
}

/// Sale quantity that found no stock to match. It contributes no income and
/// no expense; it is recorded so callers can observe the shortfall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnmatchedRemainder {
    pub date: NaiveDate,
    pub sale_id: TransactionId,
    pub platform: Platform,
    pub quantity: u32,
}

/// Raw output of one FIFO sweep, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchLog {
    pub events: Vec<MatchEvent>,
    pub unmatched: Vec<UnmatchedRemainder>,
}

/// One value per reporting view: each platform plus the unfiltered overall
/// view. A sale's contribution always lands in `overall` and in its own
/// platform's slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSplit<T> {
    pub overall: T,
    pub funpay: T,
    pub playerok: T,
}

impl<T> PlatformSplit<T> {
    pub fn view(&self, filter: PlatformFilter) -> &T {
        match filter {
            PlatformFilter::Overall => &self.overall,
            PlatformFilter::Only(Platform::Funpay) => &self.funpay,
            PlatformFilter::Only(Platform::Playerok) => &self.playerok,
        }
    }

    /// Applies `f` to the overall slot and to `platform`'s slot.
    pub fn record(&mut self, platform: Platform, mut f: impl FnMut(&mut T)) {
        f(&mut self.overall);
        match platform {
            Platform::Funpay => f(&mut self.funpay),
            Platform::Playerok => f(&mut self.playerok),
        }
    }
}

/// View selector for queries: everything, or one platform's share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    Overall,
    Only(Platform),
}

impl PlatformFilter {
    pub fn includes(&self, platform: Platform) -> bool {
        match self {
            PlatformFilter::Overall => true,
            PlatformFilter::Only(p) => *p == platform,
        }
    }
}

/// Item-type scope for queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemTypeFilter {
    #[default]
    All,
    Selected(Vec<String>),
}

impl ItemTypeFilter {
    pub fn one(name: impl Into<String>) -> Self {
        ItemTypeFilter::Selected(vec![name.into()])
    }

    pub fn resolve<'a>(&'a self, all_types: &'a [String]) -> &'a [String] {
        match self {
            ItemTypeFilter::All => all_types,
            ItemTypeFilter::Selected(types) => types,
        }
    }
}

/// Realized result of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProfit {
    pub date: NaiveDate,
    pub has_data: bool,
    pub profit: Decimal,
}

impl DayProfit {
    pub fn empty(date: NaiveDate) -> Self {
        DayProfit {
            date,
            has_data: false,
            profit: Decimal::ZERO,
        }
    }
}

/// Folded matching result: per-day profits for every reporting view, plus the
/// total sale quantity that never found stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedDays {
    pub days: PlatformSplit<BTreeMap<NaiveDate, DayProfit>>,
    pub unmatched_quantity: PlatformSplit<u32>,
}

impl MatchedDays {
    /// Folds a sweep log into per-day results. Only days with non-zero income
    /// or expense get an entry.
    pub fn from_log(log: &MatchLog) -> Self {
        let mut sums: PlatformSplit<BTreeMap<NaiveDate, (Decimal, Decimal)>> =
            PlatformSplit::default();
        for event in &log.events {
            let income = Decimal::from(event.quantity) * event.unit_net;
            let expense = Decimal::from(event.quantity) * event.unit_cost;
            sums.record(event.platform, |days| {
                let entry = days
                    .entry(event.date)
                    .or_insert((Decimal::ZERO, Decimal::ZERO));
                entry.0 += income;
                entry.1 += expense;
            });
        }

        let mut unmatched_quantity = PlatformSplit::<u32>::default();
        for remainder in &log.unmatched {
            unmatched_quantity.record(remainder.platform, |total| *total += remainder.quantity);
        }

        MatchedDays {
            days: PlatformSplit {
                overall: fold_days(sums.overall),
                funpay: fold_days(sums.funpay),
                playerok: fold_days(sums.playerok),
            },
            unmatched_quantity,
        }
    }

    /// The day's result under `filter`; an empty `DayProfit` when nothing was
    /// realized that day.
    pub fn day(&self, filter: PlatformFilter, date: NaiveDate) -> DayProfit {
        self.days
            .view(filter)
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DayProfit::empty(date))
    }
}

fn fold_days(sums: BTreeMap<NaiveDate, (Decimal, Decimal)>) -> BTreeMap<NaiveDate, DayProfit> {
    sums.into_iter()
        .filter(|(_, (income, expense))| !income.is_zero() || !expense.is_zero())
        .map(|(date, (income, expense))| {
            (
                date,
                DayProfit {
                    date,
                    has_data: true,
                    profit: income - expense,
                },
            )
        })
        .collect()
}
