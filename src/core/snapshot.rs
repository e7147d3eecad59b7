//! One poll cycle's worth of market data

use super::price::Price;
use chrono::{DateTime, Local};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fiat and crypto rates fetched together; either all four exist or none do.
#[derive(Debug, Clone, PartialEq)]
pub struct Rates {
    pub usd_to_local: Price,
    pub eur_to_local: Price,
    pub btc_usd: Price,
    pub eth_usd: Price,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// Wall clock time when fetching started, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub metal_price_per_gram: Option<Price>,
    pub fiat_usd_to_local: Option<Price>,
    pub fiat_eur_to_local: Option<Price>,
    pub crypto_btc_usd: Option<Price>,
    pub crypto_eth_usd: Option<Price>,
}

/// A snapshot with every value present, the only kind that gets reported or recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteSnapshot {
    pub timestamp: String,
    pub gold: Price,
    pub usd: Price,
    pub eur: Price,
    pub btc: Price,
    pub eth: Price,
}

pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

impl MarketSnapshot {
    pub fn new(timestamp: String, gold: Option<Price>, rates: Option<Rates>) -> Self {
        let (usd, eur, btc, eth) = match rates {
            Some(r) => (
                Some(r.usd_to_local),
                Some(r.eur_to_local),
                Some(r.btc_usd),
                Some(r.eth_usd),
            ),
            None => (None, None, None, None),
        };
        MarketSnapshot {
            timestamp,
            metal_price_per_gram: gold,
            fiat_usd_to_local: usd,
            fiat_eur_to_local: eur,
            crypto_btc_usd: btc,
            crypto_eth_usd: eth,
        }
    }

    /// Labels of the values that are absent or not positive.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("gold", &self.metal_price_per_gram),
            ("usd", &self.fiat_usd_to_local),
            ("eur", &self.fiat_eur_to_local),
            ("btc", &self.crypto_btc_usd),
            ("eth", &self.crypto_eth_usd),
        ]
        .into_iter()
        .filter(|(_, v)| !v.as_ref().is_some_and(Price::is_positive))
        .map(|(label, _)| label)
        .collect()
    }

    pub fn complete(&self) -> Option<CompleteSnapshot> {
        if !self.missing().is_empty() {
            return None;
        }
        Some(CompleteSnapshot {
            timestamp: self.timestamp.clone(),
            gold: self.metal_price_per_gram.clone()?,
            usd: self.fiat_usd_to_local.clone()?,
            eur: self.fiat_eur_to_local.clone()?,
            btc: self.crypto_btc_usd.clone()?,
            eth: self.crypto_eth_usd.clone()?,
        })
    }
}
