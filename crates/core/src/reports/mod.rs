//! Period totals, chart series, per-type statistics and the day-details
//! breakdown.

mod profit_reporter;
mod reports_model;

pub use profit_reporter::ProfitReporter;
pub use reports_model::{CarriedChunk, DailyProfitPoint, DayBreakdown, ItemTypeStat, PeriodTotals};
