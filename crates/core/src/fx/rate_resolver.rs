use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::fx::fx_model::ExchangeRate;

/// Answers "what was the CNY→RUB rate on this date" against the stored rate
/// history. Rates are step-wise: the latest rate dated on or before the query
/// date applies. With no applicable rate the resolver answers `1` — CNY is
/// treated 1:1 with RUB until the user enters a rate. That fallback is part of
/// the contract, not an error.
pub struct RateResolver {
    /// Date -> rate value. BTreeMap gives O(log N) as-of-date lookups.
    rates: BTreeMap<NaiveDate, Decimal>,
}

impl RateResolver {
    pub fn new(rates: &[ExchangeRate]) -> Self {
        // Later entries win on duplicate dates; the store keeps one per date
        // anyway.
        let rates = rates.iter().map(|r| (r.date, r.value)).collect();
        RateResolver { rates }
    }

    /// The rate valid on `date`: latest stored rate with date <= `date`,
    /// else 1.
    pub fn rate_for_date(&self, date: NaiveDate) -> Decimal {
        self.rates
            .range(..=date)
            .next_back()
            .map(|(_, value)| *value)
            .unwrap_or(Decimal::ONE)
    }

    /// The most recent stored rate regardless of date, else 1. Display
    /// helper for collaborators showing the current rate.
    pub fn latest(&self) -> Decimal {
        self.rates
            .iter()
            .next_back()
            .map(|(_, value)| *value)
            .unwrap_or(Decimal::ONE)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_rate(y: i32, m: u32, d: u32, value: Decimal) -> ExchangeRate {
        ExchangeRate {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            value,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exact_date_match() {
        let resolver = RateResolver::new(&[make_rate(2024, 3, 10, dec!(12.5))]);
        assert_eq!(resolver.rate_for_date(date(2024, 3, 10)), dec!(12.5));
    }

    #[test]
    fn test_latest_rate_on_or_before_wins() {
        let resolver = RateResolver::new(&[
            make_rate(2024, 3, 1, dec!(12.0)),
            make_rate(2024, 3, 10, dec!(13.0)),
            make_rate(2024, 3, 20, dec!(14.0)),
        ]);
        assert_eq!(resolver.rate_for_date(date(2024, 3, 15)), dec!(13.0));
    }

    #[test]
    fn test_future_rates_never_apply() {
        let resolver = RateResolver::new(&[make_rate(2024, 3, 10, dec!(12.5))]);
        assert_eq!(resolver.rate_for_date(date(2024, 3, 9)), Decimal::ONE);
    }

    #[test]
    fn test_no_rates_falls_back_to_one() {
        let resolver = RateResolver::new(&[]);
        assert_eq!(resolver.rate_for_date(date(2024, 1, 1)), Decimal::ONE);
        assert_eq!(resolver.latest(), Decimal::ONE);
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_latest_ignores_query_date() {
        let resolver = RateResolver::new(&[
            make_rate(2024, 3, 1, dec!(12.0)),
            make_rate(2024, 6, 1, dec!(15.0)),
        ]);
        assert_eq!(resolver.latest(), dec!(15.0));
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let resolver = RateResolver::new(&[
            make_rate(2024, 3, 20, dec!(14.0)),
            make_rate(2024, 3, 1, dec!(12.0)),
        ]);
        assert_eq!(resolver.rate_for_date(date(2024, 3, 5)), dec!(12.0));
    }
}
