//! Sequential collection of one cycle's prices from the three providers.

use crate::core::config::AppConfig;
use crate::core::snapshot::format_timestamp;
use crate::core::{
    CryptoPriceProvider, ExchangeRateProvider, FetchError, MarketSnapshot, MetalPriceProvider,
    Price, Rates,
};
use crate::providers::{CoinGeckoProvider, ExchangeRateApiProvider, GoldApiProvider, util};
use anyhow::Result;
use chrono::Local;
use std::collections::HashMap;
use tracing::{debug, warn};

const CRYPTO_IDS: [&str; 2] = ["bitcoin", "ethereum"];
const CRYPTO_VS_CURRENCY: &str = "usd";

pub struct PriceFetcher {
    metal: Box<dyn MetalPriceProvider>,
    fiat: Box<dyn ExchangeRateProvider>,
    crypto: Box<dyn CryptoPriceProvider>,
    local_currency: String,
}

impl PriceFetcher {
    pub fn new(
        metal: Box<dyn MetalPriceProvider>,
        fiat: Box<dyn ExchangeRateProvider>,
        crypto: Box<dyn CryptoPriceProvider>,
        local_currency: &str,
    ) -> Self {
        PriceFetcher {
            metal,
            fiat,
            crypto,
            local_currency: local_currency.to_string(),
        }
    }

    /// Wires up the real providers from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = util::http_client()?;
        Ok(Self::new(
            Box::new(GoldApiProvider::new(
                &config.gold_base_url,
                &config.secrets.gold_api_key,
                client.clone(),
            )),
            Box::new(ExchangeRateApiProvider::new(
                &config.exchange_base_url,
                &config.secrets.exchange_api_key,
                client.clone(),
            )),
            Box::new(CoinGeckoProvider::new(&config.coingecko_base_url, client)),
            &config.local_currency,
        ))
    }

    pub async fn fetch_metal_price(&self) -> Result<Price, FetchError> {
        self.metal
            .price_per_gram(&self.local_currency)
            .await
            .inspect_err(|e| warn!(error = %e, "Error fetching gold price"))
    }

    /// Fetches USD and EUR to local currency, then BTC and ETH in USD.
    ///
    /// The first failure aborts the remaining requests and nothing fetched so far is returned.
    pub async fn fetch_fiat_and_crypto_rates(&self) -> Result<Rates, FetchError> {
        self.fetch_rates_in_order()
            .await
            .inspect_err(|e| warn!(error = %e, "Error fetching rates"))
    }

    async fn fetch_rates_in_order(&self) -> Result<Rates, FetchError> {
        let usd_to_local = self.fiat.rate("USD", &self.local_currency).await?;
        let eur_to_local = self.fiat.rate("EUR", &self.local_currency).await?;

        let mut crypto = self.crypto.prices(&CRYPTO_IDS, CRYPTO_VS_CURRENCY).await?;
        let btc_usd = take_asset(&mut crypto, "bitcoin")?;
        let eth_usd = take_asset(&mut crypto, "ethereum")?;

        Ok(Rates {
            usd_to_local,
            eur_to_local,
            btc_usd,
            eth_usd,
        })
    }

    /// Runs both fetches and assembles the cycle's snapshot, stamped when fetching began.
    pub async fn fetch_snapshot(&self) -> MarketSnapshot {
        let timestamp = format_timestamp(Local::now());
        let gold = self.fetch_metal_price().await.ok();
        let rates = self.fetch_fiat_and_crypto_rates().await.ok();
        debug!(%timestamp, ?gold, ?rates, "Fetched market data");
        MarketSnapshot::new(timestamp, gold, rates)
    }
}

fn take_asset(prices: &mut HashMap<String, Price>, id: &str) -> Result<Price, FetchError> {
    prices
        .remove(id)
        .ok_or_else(|| FetchError::MissingField(format!("{id}.{CRYPTO_VS_CURRENCY}")))
}
