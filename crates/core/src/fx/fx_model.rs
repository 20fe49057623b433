use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A manually entered CNY→RUB rate effective from `date` onward, until a
/// later-dated rate supersedes it. At most one rate is kept per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub date: NaiveDate,
    pub value: Decimal,
}
