use chrono::NaiveDate;
use log::debug;
use num_traits::Zero;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::fx::ExchangeRate;
use crate::ledger::{Purchase, Sale, Transaction, TransactionId};
use crate::matching::{FifoMatcher, ItemTypeFilter, PlatformAllocator, PlatformFilter};
use crate::utils::time_utils::days_between;
use crate::valuation::{CommissionSettings, ValuationCalculator};

use super::reports_model::{
    CarriedChunk, DailyProfitPoint, DayBreakdown, ItemTypeStat, PeriodTotals,
};

/// Period and per-day reporting over one ledger snapshot.
///
/// Two aggregation modes share every query. Equalized mode runs the FIFO
/// matcher capped at the range end and keeps only matches whose sale falls
/// inside the range, so a sale can realize cost from a purchase made before
/// the range began. Simple mode sums the range's transactions directly and
/// recognizes cost on the purchase date, with no matching at all.
pub struct ProfitReporter<'a> {
    purchases: &'a [Purchase],
    sales: &'a [Sale],
    item_types: &'a [String],
    valuation: ValuationCalculator<'a>,
}

impl<'a> ProfitReporter<'a> {
    pub fn new(
        purchases: &'a [Purchase],
        sales: &'a [Sale],
        item_types: &'a [String],
        rates: &[ExchangeRate],
        commission: &'a CommissionSettings,
    ) -> Self {
        ProfitReporter {
            purchases,
            sales,
            item_types,
            valuation: ValuationCalculator::new(rates, commission),
        }
    }

    pub fn period_totals(
        &self,
        types: &ItemTypeFilter,
        from: NaiveDate,
        to: NaiveDate,
        equalize: bool,
        platform: PlatformFilter,
    ) -> PeriodTotals {
        let item_types = types.resolve(self.item_types);
        debug!(
            "computing {} period totals over {} item types, {} to {}",
            if equalize { "equalized" } else { "simple" },
            item_types.len(),
            from,
            to
        );
        if equalize {
            self.equalized_totals(item_types, from, to, platform)
        } else {
            self.simple_totals(item_types, from, to, platform)
        }
    }

    fn equalized_totals(
        &self,
        item_types: &[String],
        from: NaiveDate,
        to: NaiveDate,
        platform: PlatformFilter,
    ) -> PeriodTotals {
        let log =
            FifoMatcher::new(&self.valuation).sweep(self.purchases, self.sales, item_types, Some(to));

        let mut totals = PeriodTotals::default();
        for event in &log.events {
            if event.date < from || event.date > to || !platform.includes(event.platform) {
                continue;
            }
            totals.total_income += Decimal::from(event.quantity) * event.unit_net;
            totals.total_expense += Decimal::from(event.quantity) * event.unit_cost;
            totals.bought_quantity += event.quantity;
            totals.sold_quantity += event.quantity;
        }
        for remainder in &log.unmatched {
            if remainder.date < from || remainder.date > to {
                continue;
            }
            if platform.includes(remainder.platform) {
                totals.unmatched_quantity += remainder.quantity;
            }
        }
        totals
    }

    fn simple_totals(
        &self,
        item_types: &[String],
        from: NaiveDate,
        to: NaiveDate,
        platform: PlatformFilter,
    ) -> PeriodTotals {
        let selected: HashSet<&str> = item_types.iter().map(String::as_str).collect();

        let mut totals = PeriodTotals::default();
        for sale in self.sales {
            if !selected.contains(sale.item_type.as_str()) || sale.date < from || sale.date > to {
                continue;
            }
            if !platform.includes(sale.platform) {
                continue;
            }
            totals.total_income += self.valuation.net_sale_amount(sale);
            totals.sold_quantity += sale.quantity;
        }

        match platform {
            PlatformFilter::Overall => {
                for purchase in self.purchases {
                    if !selected.contains(purchase.item_type.as_str())
                        || purchase.date < from
                        || purchase.date > to
                    {
                        continue;
                    }
                    totals.total_expense += self.valuation.amount_in_reporting_currency(purchase);
                    totals.bought_quantity += purchase.quantity;
                }
            }
            PlatformFilter::Only(side) => {
                // Purchases carry no platform, so their share of the period is
                // whatever this platform's sales consumed plus unsold stock.
                let allocations = PlatformAllocator::new(&self.valuation).allocate(
                    self.purchases,
                    self.sales,
                    item_types,
                    Some(to),
                );
                for purchase in self.purchases {
                    if !selected.contains(purchase.item_type.as_str())
                        || purchase.date < from
                        || purchase.date > to
                    {
                        continue;
                    }
                    if let Some(allocation) = allocations.get(&purchase.id) {
                        totals.bought_quantity += allocation.effective_quantity(side);
                        totals.total_expense += allocation.effective_expense(side);
                    }
                }
            }
        }
        totals
    }

    /// One point per calendar day of `[from, to]`, in order. Days without
    /// activity are present with zero profit and `has_data = false`. The sold
    /// count is the day's raw sale quantity in both modes.
    pub fn daily_profit_series(
        &self,
        types: &ItemTypeFilter,
        from: NaiveDate,
        to: NaiveDate,
        equalize: bool,
        platform: PlatformFilter,
    ) -> Vec<DailyProfitPoint> {
        let item_types = types.resolve(self.item_types);
        let selected: HashSet<&str> = item_types.iter().map(String::as_str).collect();
        let mut by_day: BTreeMap<NaiveDate, (Decimal, Decimal, u32)> = BTreeMap::new();

        if equalize {
            let log = FifoMatcher::new(&self.valuation).sweep(
                self.purchases,
                self.sales,
                item_types,
                Some(to),
            );
            for event in &log.events {
                if event.date < from || event.date > to || !platform.includes(event.platform) {
                    continue;
                }
                let entry = by_day
                    .entry(event.date)
                    .or_insert((Decimal::zero(), Decimal::zero(), 0));
                entry.0 += Decimal::from(event.quantity) * event.unit_net;
                entry.1 += Decimal::from(event.quantity) * event.unit_cost;
            }
        } else {
            for sale in self.sales {
                if !selected.contains(sale.item_type.as_str())
                    || sale.date < from
                    || sale.date > to
                    || !platform.includes(sale.platform)
                {
                    continue;
                }
                let entry = by_day
                    .entry(sale.date)
                    .or_insert((Decimal::zero(), Decimal::zero(), 0));
                entry.0 += self.valuation.net_sale_amount(sale);
            }

            let allocations = match platform {
                PlatformFilter::Overall => None,
                PlatformFilter::Only(_) => Some(PlatformAllocator::new(&self.valuation).allocate(
                    self.purchases,
                    self.sales,
                    item_types,
                    Some(to),
                )),
            };
            for purchase in self.purchases {
                if !selected.contains(purchase.item_type.as_str())
                    || purchase.date < from
                    || purchase.date > to
                {
                    continue;
                }
                let expense = match (&allocations, platform) {
                    (Some(allocations), PlatformFilter::Only(side)) => allocations
                        .get(&purchase.id)
                        .map(|a| a.effective_expense(side))
                        .unwrap_or_else(Decimal::zero),
                    _ => self.valuation.amount_in_reporting_currency(purchase),
                };
                let entry = by_day
                    .entry(purchase.date)
                    .or_insert((Decimal::zero(), Decimal::zero(), 0));
                entry.1 += expense;
            }
        }

        // Mode only shapes income and expense; an oversold day still shows
        // every unit sold.
        for sale in self.sales {
            if !selected.contains(sale.item_type.as_str())
                || sale.date < from
                || sale.date > to
                || !platform.includes(sale.platform)
            {
                continue;
            }
            let entry = by_day
                .entry(sale.date)
                .or_insert((Decimal::zero(), Decimal::zero(), 0));
            entry.2 += sale.quantity;
        }

        days_between(from, to)
            .into_iter()
            .map(|day| match by_day.get(&day) {
                Some((income, expense, sold)) => DailyProfitPoint {
                    date: day,
                    has_data: !income.is_zero() || !expense.is_zero() || *sold > 0,
                    profit: *income - *expense,
                    sold_quantity: *sold,
                },
                None => DailyProfitPoint {
                    date: day,
                    has_data: false,
                    profit: Decimal::zero(),
                    sold_quantity: 0,
                },
            })
            .collect()
    }

    /// One row per item type with any bought or sold quantity in range, in
    /// ledger order.
    pub fn item_type_stats(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        equalize: bool,
        platform: PlatformFilter,
    ) -> Vec<ItemTypeStat> {
        let mut rows = Vec::new();
        for item_type in self.item_types {
            let filter = ItemTypeFilter::one(item_type.clone());
            let totals = self.period_totals(&filter, from, to, equalize, platform);
            if totals.bought_quantity == 0 && totals.sold_quantity == 0 {
                continue;
            }
            rows.push(ItemTypeStat {
                item_type: item_type.clone(),
                bought_quantity: totals.bought_quantity,
                sold_quantity: totals.sold_quantity,
                total_income: totals.total_income,
                total_expense: totals.total_expense,
                profit: totals.profit(),
            });
        }
        rows
    }

    /// Opening stock, consumption and realized result for one day, from a
    /// fresh full-history pass.
    pub fn day_breakdown(&self, date: NaiveDate) -> DayBreakdown {
        let log =
            FifoMatcher::new(&self.valuation).sweep(self.purchases, self.sales, self.item_types, None);

        let mut consumed_before: HashMap<TransactionId, u32> = HashMap::new();
        let mut consumed_today: BTreeMap<TransactionId, u32> = BTreeMap::new();
        let mut total_income = Decimal::zero();
        let mut total_expense = Decimal::zero();
        for event in &log.events {
            if event.date < date {
                *consumed_before.entry(event.purchase_id).or_insert(0) += event.quantity;
            } else if event.date == date {
                *consumed_today.entry(event.purchase_id).or_insert(0) += event.quantity;
                total_income += Decimal::from(event.quantity) * event.unit_net;
                total_expense += Decimal::from(event.quantity) * event.unit_cost;
            }
        }

        let unmatched_quantity = log
            .unmatched
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.quantity)
            .sum();

        let known: HashSet<&str> = self.item_types.iter().map(String::as_str).collect();
        let mut opening: Vec<&Purchase> = self
            .purchases
            .iter()
            .filter(|p| p.date < date && known.contains(p.item_type.as_str()))
            .collect();
        opening.sort_by_key(|p| p.sort_key());

        let carried_in = opening
            .into_iter()
            .filter_map(|purchase| {
                let consumed = consumed_before.get(&purchase.id).copied().unwrap_or(0);
                let remaining = purchase.quantity - consumed;
                if remaining == 0 {
                    return None;
                }
                Some(CarriedChunk {
                    purchase_id: purchase.id,
                    item_type: purchase.item_type.clone(),
                    date: purchase.date,
                    remaining_quantity: remaining,
                    unit_cost: self.valuation.purchase_unit_cost(purchase),
                })
            })
            .collect();

        DayBreakdown {
            date,
            carried_in,
            consumed_today,
            unmatched_quantity,
            total_income,
            total_expense,
            profit: total_income - total_expense,
        }
    }
}
