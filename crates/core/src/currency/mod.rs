//! Multi-currency handling and exchange rates.

pub mod conversion;
pub mod exchange;
pub mod service;

#[cfg(test)]
mod props;

pub use conversion::CurrencyConverter;
pub use exchange::{ExchangeRate, ExchangeRateStore, RateOrigin, RatePair};
pub use service::CurrencyService;
