//! Core domain types and abstractions

pub mod config;
pub mod log;
pub mod price;
pub mod report;
pub mod schedule;
pub mod snapshot;

// Re-export main types for cleaner imports
pub use price::{CryptoPriceProvider, ExchangeRateProvider, FetchError, MetalPriceProvider, Price};
pub use report::Report;
pub use schedule::{Sleeper, TokioSleeper};
pub use snapshot::{CompleteSnapshot, MarketSnapshot, Rates};
