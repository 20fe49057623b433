//! Ledger domain - transactions, item types, the owning store and the
//! interchange format.

mod ledger_backup;
mod ledger_errors;
mod ledger_model;
mod ledger_store;

pub use ledger_backup::{LedgerBackup, LedgerData};
pub use ledger_errors::LedgerError;
pub use ledger_model::{
    Currency, NewPurchase, NewSale, Platform, Purchase, Sale, Transaction, TransactionId,
};
pub use ledger_store::LedgerStore;

#[cfg(test)]
mod ledger_backup_tests;

#[cfg(test)]
mod ledger_store_tests;
