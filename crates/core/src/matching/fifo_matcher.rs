use chrono::NaiveDate;
use log::warn;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::ledger::{Purchase, Sale, Transaction};
use crate::valuation::ValuationCalculator;

use super::matching_model::{
    MatchEvent, MatchLog, MatchedDays, PurchaseChunk, UnmatchedRemainder,
};

/// Chronological FIFO matching of sales against purchased stock.
///
/// The sweep walks every distinct transaction date in ascending order. Within
/// a date each item type is handled in isolation: the day's purchases are
/// enqueued first (ordered by time, ties stable), then the day's sales consume
/// from the oldest chunk forward. A chunk created on day D and consumed on day
/// D+k puts its expense on day D+k - the day of consumption carries the cost,
/// not the day of purchase.
///
/// Every call owns its queues; no state survives between sweeps.
pub struct FifoMatcher<'a> {
    valuation: &'a ValuationCalculator<'a>,
}

impl<'a> FifoMatcher<'a> {
    pub fn new(valuation: &'a ValuationCalculator<'a>) -> Self {
        FifoMatcher { valuation }
    }

    /// Runs one full sweep over the selected item types, optionally capped to
    /// transactions dated on or before `max_date`, and returns the raw
    /// allocation log.
    pub fn sweep(
        &self,
        purchases: &[Purchase],
        sales: &[Sale],
        item_types: &[String],
        max_date: Option<NaiveDate>,
    ) -> MatchLog {
        let purchases_by_type = group_by_type_and_date(purchases, item_types, max_date);
        let sales_by_type = group_by_type_and_date(sales, item_types, max_date);

        let mut all_dates: BTreeSet<NaiveDate> = BTreeSet::new();
        for by_date in purchases_by_type.values() {
            all_dates.extend(by_date.keys().copied());
        }
        for by_date in sales_by_type.values() {
            all_dates.extend(by_date.keys().copied());
        }

        let mut queues: HashMap<&str, VecDeque<PurchaseChunk>> = HashMap::new();
        let mut log = MatchLog::default();

        for &date in &all_dates {
            for item_type in item_types {
                let queue = queues.entry(item_type.as_str()).or_default();

                if let Some(day_purchases) = purchases_by_type
                    .get(item_type.as_str())
                    .and_then(|by_date| by_date.get(&date))
                {
                    for purchase in day_purchases {
                        // zero-quantity records produce no chunk
                        if purchase.quantity == 0 {
                            continue;
                        }
                        queue.push_back(PurchaseChunk {
                            purchase_id: purchase.id,
                            remaining_quantity: purchase.quantity,
                            unit_cost: self.valuation.purchase_unit_cost(purchase),
                        });
                    }
                }

                if let Some(day_sales) = sales_by_type
                    .get(item_type.as_str())
                    .and_then(|by_date| by_date.get(&date))
                {
                    for sale in day_sales {
                        self.consume(queue, sale, &mut log);
                    }
                }
            }
        }

        log
    }

    /// One sweep folded into per-day, per-view results.
    pub fn match_days(
        &self,
        purchases: &[Purchase],
        sales: &[Sale],
        item_types: &[String],
        max_date: Option<NaiveDate>,
    ) -> MatchedDays {
        MatchedDays::from_log(&self.sweep(purchases, sales, item_types, max_date))
    }

    fn consume(&self, queue: &mut VecDeque<PurchaseChunk>, sale: &Sale, log: &mut MatchLog) {
        if sale.quantity == 0 {
            return;
        }
        let unit_net = self.valuation.sale_unit_net(sale);

        let mut remaining = sale.quantity;
        for chunk in queue.iter_mut() {
            if remaining == 0 {
                break;
            }
            let take = chunk.remaining_quantity.min(remaining);
            if take == 0 {
                continue;
            }
            log.events.push(MatchEvent {
                date: sale.date,
                sale_id: sale.id,
                platform: sale.platform,
                purchase_id: chunk.purchase_id,
                quantity: take,
                unit_net,
                unit_cost: chunk.unit_cost,
            });
            chunk.remaining_quantity -= take;
            remaining -= take;
        }
        queue.retain(|chunk| chunk.remaining_quantity > 0);

        if remaining > 0 {
            warn!(
                "sale {} ({} x{}) on {} left {} units unmatched - no stock available",
                sale.id, sale.item_type, sale.quantity, sale.date, remaining
            );
            log.unmatched.push(UnmatchedRemainder {
                date: sale.date,
                sale_id: sale.id,
                platform: sale.platform,
                quantity: remaining,
            });
        }
    }
}

/// Groups transactions of the selected item types by type, then by date. Each
/// day's list is ordered by time, with ties keeping insertion order.
fn group_by_type_and_date<'t, T: Transaction>(
    transactions: &'t [T],
    item_types: &[String],
    max_date: Option<NaiveDate>,
) -> HashMap<&'t str, BTreeMap<NaiveDate, Vec<&'t T>>> {
    let selected: HashSet<&str> = item_types.iter().map(String::as_str).collect();

    let mut grouped: HashMap<&str, BTreeMap<NaiveDate, Vec<&T>>> = HashMap::new();
    for tx in transactions {
        if !selected.contains(tx.item_type()) {
            continue;
        }
        if let Some(cap) = max_date {
            if tx.date() > cap {
                continue;
            }
        }
        grouped
            .entry(tx.item_type())
            .or_default()
            .entry(tx.date())
            .or_default()
            .push(tx);
    }
    for by_date in grouped.values_mut() {
        for day in by_date.values_mut() {
            day.sort_by_key(|tx| tx.effective_time());
        }
    }
    grouped
}
