pub mod coingecko;
pub mod exchange_rate;
pub mod goldapi;
pub mod util;

pub use coingecko::CoinGeckoProvider;
pub use exchange_rate::ExchangeRateApiProvider;
pub use goldapi::GoldApiProvider;
