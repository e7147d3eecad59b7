use super::util::get_json;
use crate::core::{ExchangeRateProvider, FetchError, Price};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// ExchangeRate-API v6 client. The API key travels in the URL path.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: &str, client: reqwest::Client) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    conversion_rates: Option<HashMap<String, Option<serde_json::Number>>>,
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn rate(&self, from: &str, to: &str) -> Result<Price, FetchError> {
        let url = format!("{}/{}/latest/{}", self.base_url, self.api_key, from);
        debug!("Requesting {} rates", from);

        let data: LatestRatesResponse = get_json(self.client.get(&url)).await?;

        data.conversion_rates
            .and_then(|mut rates| rates.remove(to).flatten())
            .map(Price::from)
            .ok_or_else(|| FetchError::MissingField(format!("conversion_rates.{to}")))
    }
}
