use super::util::get_json;
use crate::core::{FetchError, MetalPriceProvider, Price};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

pub struct GoldApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoldApiProvider {
    pub fn new(base_url: &str, api_key: &str, client: reqwest::Client) -> Self {
        GoldApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoldApiResponse {
    price_gram_24k: Option<serde_json::Number>,
}

#[async_trait]
impl MetalPriceProvider for GoldApiProvider {
    #[instrument(name = "GoldPriceFetch", skip(self))]
    async fn price_per_gram(&self, currency: &str) -> Result<Price, FetchError> {
        let url = format!("{}/XAU/{}", self.base_url, currency);
        debug!("Requesting gold price from {}", url);

        let request = self
            .client
            .get(&url)
            .header("x-access-token", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let data: GoldApiResponse = get_json(request).await?;

        data.price_gram_24k
            .map(Price::from)
            .ok_or_else(|| FetchError::MissingField("price_gram_24k".to_string()))
    }
}
