//! Ledger domain models.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable identifier of a purchase or sale record.
///
/// Assigned by the store as `max(existing) + 1`, so ledgers imported from the
/// legacy epoch-millisecond scheme keep their ids and never collide with new
/// ones.
pub type TransactionId = i64;

/// Currency a transaction was priced in. RUB is the reporting currency;
/// CNY amounts are converted through the date-scoped rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Cny,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Cny => "CNY",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marketplace a sale happened on. Each platform takes its own commission.
/// Legacy records carry no platform field and deserialize as `Funpay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Funpay,
    Playerok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Funpay => "funpay",
            Platform::Playerok => "playerok",
        }
    }

    /// Both platforms, in wire order.
    pub const ALL: [Platform; 2] = [Platform::Funpay, Platform::Playerok];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common accessors shared by purchases and sales.
///
/// `original_amount` is always the total for the whole `quantity`, never a
/// per-unit price. The `(date, time)` sort key orders transactions within the
/// matching sweep; records without a time sort at midnight.
pub trait Transaction {
    fn id(&self) -> TransactionId;
    fn item_type(&self) -> &str;
    fn currency(&self) -> Currency;
    fn original_amount(&self) -> Decimal;
    fn quantity(&self) -> u32;
    fn date(&self) -> NaiveDate;
    fn time(&self) -> Option<NaiveTime>;

    fn effective_time(&self) -> NaiveTime {
        self.time().unwrap_or(NaiveTime::MIN)
    }

    fn sort_key(&self) -> (NaiveDate, NaiveTime) {
        (self.date(), self.effective_time())
    }
}

/// A purchase of `quantity` units of one item type for `original_amount`
/// in `currency`, all acquired at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: TransactionId,
    pub item_type: String,
    pub currency: Currency,
    pub original_amount: Decimal,
    pub quantity: u32,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_format")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

impl Transaction for Purchase {
    fn id(&self) -> TransactionId {
        self.id
    }
    fn item_type(&self) -> &str {
        &self.item_type
    }
    fn currency(&self) -> Currency {
        self.currency
    }
    fn original_amount(&self) -> Decimal {
        self.original_amount
    }
    fn quantity(&self) -> u32 {
        self.quantity
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}

/// A sale of `quantity` units of one item type on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: TransactionId,
    pub item_type: String,
    pub currency: Currency,
    pub original_amount: Decimal,
    pub quantity: u32,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_format")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub platform: Platform,
}

impl Transaction for Sale {
    fn id(&self) -> TransactionId {
        self.id
    }
    fn item_type(&self) -> &str {
        &self.item_type
    }
    fn currency(&self) -> Currency {
        self.currency
    }
    fn original_amount(&self) -> Decimal {
        self.original_amount
    }
    fn quantity(&self) -> u32 {
        self.quantity
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}

/// Field set for creating a purchase or replacing an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub item_type: String,
    pub currency: Currency,
    pub original_amount: Decimal,
    pub quantity: u32,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_format")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

impl NewPurchase {
    pub(crate) fn into_purchase(self, id: TransactionId) -> Purchase {
        Purchase {
            id,
            item_type: self.item_type,
            currency: self.currency,
            original_amount: self.original_amount,
            quantity: self.quantity,
            date: self.date,
            time: self.time,
        }
    }
}

/// Field set for creating a sale or replacing an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub item_type: String,
    pub currency: Currency,
    pub original_amount: Decimal,
    pub quantity: u32,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_format")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub platform: Platform,
}

impl NewSale {
    pub(crate) fn into_sale(self, id: TransactionId) -> Sale {
        Sale {
            id,
            item_type: self.item_type,
            currency: self.currency,
            original_amount: self.original_amount,
            quantity: self.quantity,
            date: self.date,
            time: self.time,
            platform: self.platform,
        }
    }
}

// Wire format for transaction times: "HH:MM", with the empty string treated
// as absent (legacy exports wrote "" when no time was entered).
mod hhmm_format {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
