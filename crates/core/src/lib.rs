//! Flipfolio Core - FIFO cost-basis matching and profit engine.
//!
//! This crate contains the whole profit engine for a two-currency resale
//! ledger: the ledger store and its mutation surface, date-scoped exchange
//! rates, per-platform sale commissions, FIFO matching of sold units against
//! purchased stock, and the period/per-day reports built on top. Persistence
//! and presentation live in the collaborators that call into this crate.

pub mod constants;
pub mod errors;
pub mod fx;
pub mod ledger;
pub mod matching;
pub mod reports;
pub mod utils;
pub mod valuation;

// Re-export the domain types collaborators interact with
pub use ledger::*;
pub use matching::*;
pub use reports::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
