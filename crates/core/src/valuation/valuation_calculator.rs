use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::fx::{ExchangeRate, RateResolver};
use crate::ledger::{Currency, Purchase, Sale, Transaction};

use super::commission::CommissionSettings;

/// Values transactions in the reporting currency (RUB).
///
/// Conversion is date-scoped: a CNY amount converts at the rate valid on the
/// transaction's own date, never at "today's" rate. Sale valuations
/// additionally net out the platform commission.
pub struct ValuationCalculator<'a> {
    resolver: RateResolver,
    commission: &'a CommissionSettings,
}

impl<'a> ValuationCalculator<'a> {
    pub fn new(rates: &[ExchangeRate], commission: &'a CommissionSettings) -> Self {
        ValuationCalculator {
            resolver: RateResolver::new(rates),
            commission,
        }
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    /// Total transaction amount in RUB, converted at the transaction-date
    /// rate.
    pub fn amount_in_reporting_currency(&self, tx: &impl Transaction) -> Decimal {
        self.convert(tx.original_amount(), tx.currency(), tx.date())
    }

    /// Sale amount in RUB after the platform commission.
    pub fn net_sale_amount(&self, sale: &Sale) -> Decimal {
        self.amount_in_reporting_currency(sale) * self.commission.multiplier(sale.platform)
    }

    /// Per-unit acquisition cost, fixed at the purchase's own date.
    pub fn purchase_unit_cost(&self, purchase: &Purchase) -> Decimal {
        // zero-quantity records value to nothing rather than divide
        if purchase.quantity == 0 {
            return Decimal::ZERO;
        }
        self.amount_in_reporting_currency(purchase) / Decimal::from(purchase.quantity)
    }

    /// Per-unit net proceeds of a sale.
    pub fn sale_unit_net(&self, sale: &Sale) -> Decimal {
        if sale.quantity == 0 {
            return Decimal::ZERO;
        }
        self.net_sale_amount(sale) / Decimal::from(sale.quantity)
    }

    fn convert(&self, amount: Decimal, currency: Currency, date: NaiveDate) -> Decimal {
        match currency {
            Currency::Rub => amount,
            Currency::Cny => amount * self.resolver.rate_for_date(date),
        }
    }
}
