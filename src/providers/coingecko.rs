use super::util::get_json;
use crate::core::{CryptoPriceProvider, FetchError, Price};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// CoinGecko `simple/price` client. No API key is needed for the public tier.
pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

type SimplePriceResponse = HashMap<String, HashMap<String, Option<serde_json::Number>>>;

#[async_trait]
impl CryptoPriceProvider for CoinGeckoProvider {
    #[instrument(name = "CryptoPriceFetch", skip(self))]
    async fn prices(
        &self,
        ids: &[&str],
        vs_currency: &str,
    ) -> Result<HashMap<String, Price>, FetchError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/simple/price", self.base_url),
            &[("ids", ids.join(",").as_str()), ("vs_currencies", vs_currency)],
        )
        .map_err(|e| FetchError::Connection(format!("invalid url: {e}")))?;
        debug!("Requesting crypto prices from {}", url);

        let data: SimplePriceResponse = get_json(self.client.get(url)).await?;

        Ok(data
            .into_iter()
            .filter_map(|(id, mut quotes)| {
                quotes
                    .remove(vs_currency)
                    .flatten()
                    .map(|price| (id, Price::from(price)))
            })
            .collect())
    }
}
