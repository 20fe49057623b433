use chrono::NaiveDate;
use thiserror::Error;

use super::ledger_model::TransactionId;

/// Errors surfaced by ledger store mutations.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Item type '{0}' does not exist")]
    ItemTypeNotFound(String),

    #[error("Item type '{0}' already exists")]
    DuplicateItemType(String),

    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionId),

    #[error("No exchange rate stored for {0}")]
    RateNotFound(NaiveDate),
}
