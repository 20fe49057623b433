//! Report shapes handed to UI collaborators.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::TransactionId;

/// Aggregated result of one reporting period.
///
/// In equalized mode `bought_quantity` and `sold_quantity` are both the FIFO
/// matched quantity; in simple mode they are the raw filtered purchase and
/// sale quantities (purchase side scaled to the platform share when a platform
/// filter is active). `unmatched_quantity` is only populated by equalized
/// queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub bought_quantity: u32,
    pub sold_quantity: u32,
    pub unmatched_quantity: u32,
}

impl PeriodTotals {
    pub fn profit(&self) -> Decimal {
        self.total_income - self.total_expense
    }
}

/// One day of the dense profit chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProfitPoint {
    pub date: NaiveDate,
    pub has_data: bool,
    pub profit: Decimal,
    pub sold_quantity: u32,
}

/// One row of the per-item-type statistics table. Rows with no bought and no
/// sold quantity in range are not emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTypeStat {
    pub item_type: String,
    pub bought_quantity: u32,
    pub sold_quantity: u32,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub profit: Decimal,
}

/// Stock that entered a day unsold: what is left of one purchase when the day
/// opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarriedChunk {
    pub purchase_id: TransactionId,
    pub item_type: String,
    pub date: NaiveDate,
    pub remaining_quantity: u32,
    pub unit_cost: Decimal,
}

/// Everything the day-details view needs for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    pub date: NaiveDate,
    /// Unsold stock at the start of the day, in FIFO order.
    pub carried_in: Vec<CarriedChunk>,
    /// Quantity consumed from each purchase by that day's sales.
    pub consumed_today: BTreeMap<TransactionId, u32>,
    pub unmatched_quantity: u32,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub profit: Decimal,
}
