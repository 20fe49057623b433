use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::BACKUP_FORMAT_VERSION;
use crate::errors::Result;
use crate::fx::ExchangeRate;

use super::ledger_model::{Purchase, Sale};
use super::ledger_store::LedgerStore;

/// The persistence shape: the four ledger lists and nothing else. This is
/// what the storage collaborator writes and what imports must contain.
///
/// `itemTypes`, `purchases` and `sales` are required on import; `rates` may be
/// absent in files written before rate support existed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerData {
    pub item_types: Vec<String>,
    pub purchases: Vec<Purchase>,
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub rates: Vec<ExchangeRate>,
}

impl LedgerData {
    /// Parses an exported backup or a bare data file. Malformed JSON or a
    /// missing required list is rejected here, before any store is touched;
    /// the export stamp and unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: LedgerData = serde_json::from_str(json)?;
        debug!(
            "parsed ledger data: {} item types, {} purchases, {} sales, {} rates",
            data.item_types.len(),
            data.purchases.len(),
            data.sales.len(),
            data.rates.len()
        );
        Ok(data)
    }
}

/// A `LedgerData` snapshot plus the stamp written on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBackup {
    #[serde(flatten)]
    pub data: LedgerData,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl LedgerBackup {
    pub fn from_store(store: &LedgerStore) -> Self {
        LedgerBackup {
            data: store.to_data(),
            export_date: Utc::now(),
            version: BACKUP_FORMAT_VERSION.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
