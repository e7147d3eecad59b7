//! Price values, fetch errors and the provider abstractions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;

/// A price exactly as the provider reported it.
///
/// Wraps the JSON number so the report and the ledger show `4500.0` and `65000`
/// the way they came off the wire rather than a reformatted float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(serde_json::Number);

impl Price {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    /// Prices of zero or below are never meaningful and count as missing.
    pub fn is_positive(&self) -> bool {
        self.as_f64() > 0.0
    }
}

impl From<serde_json::Number> for Price {
    fn from(value: serde_json::Number) -> Self {
        Price(value)
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Price(value.into())
    }
}

impl TryFrom<f64> for Price {
    type Error = FetchError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        serde_json::Number::from_f64(value)
            .map(Price)
            .ok_or_else(|| FetchError::Malformed(format!("non-finite price: {value}")))
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a single outbound price request produced no value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("provider answered with HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("field `{0}` missing from response")]
    MissingField(String),
}

#[async_trait]
pub trait MetalPriceProvider: Send + Sync {
    /// 24 karat gold price per gram in `currency`.
    async fn price_per_gram(&self, currency: &str) -> Result<Price, FetchError>;
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Units of `to` bought by one unit of `from`.
    async fn rate(&self, from: &str, to: &str) -> Result<Price, FetchError>;
}

#[async_trait]
pub trait CryptoPriceProvider: Send + Sync {
    /// Prices of `ids` in `vs_currency`, keyed by asset id. Assets the provider
    /// did not price are absent from the map.
    async fn prices(
        &self,
        ids: &[&str],
        vs_currency: &str,
    ) -> Result<HashMap<String, Price>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_keeps_provider_formatting() {
        let gold: Price = serde_json::from_str("4500.0").unwrap();
        let btc: Price = serde_json::from_str("65000").unwrap();
        assert_eq!(gold.to_string(), "4500.0");
        assert_eq!(btc.to_string(), "65000");
        assert_eq!(btc.as_f64(), 65000.0);
    }

    #[test]
    fn test_price_positivity() {
        assert!(Price::try_from(49.5).unwrap().is_positive());
        assert!(!Price::from(0u64).is_positive());
        assert!(!Price::try_from(-1.0).unwrap().is_positive());
    }

    #[test]
    fn test_non_finite_price_rejected() {
        assert!(matches!(
            Price::try_from(f64::NAN),
            Err(FetchError::Malformed(_))
        ));
    }
}
