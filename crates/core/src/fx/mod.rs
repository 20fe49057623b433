//! FX module - stored exchange rates and date-scoped rate resolution.

mod fx_model;
mod rate_resolver;

pub use fx_model::ExchangeRate;
pub use rate_resolver::RateResolver;
