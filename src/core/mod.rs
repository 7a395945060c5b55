//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod feed;
pub mod log;
pub mod rate;
pub mod store;
pub mod time;

// Re-export main types for cleaner imports
pub use cache::RateCache;
pub use currency::{BASE_CURRENCY, CurrencyCode};
pub use error::RateError;
pub use feed::RateFeedSource;
pub use rate::{ConversionResult, ExchangeRate, ExchangeRateSnapshot};
pub use store::RateStore;
