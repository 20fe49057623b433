//! Valuation module - reporting-currency conversion and platform commissions.

mod commission;
mod valuation_calculator;

pub use commission::CommissionSettings;
pub use valuation_calculator::ValuationCalculator;
