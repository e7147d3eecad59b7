use crate::core::FetchError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Upper bound on every outbound price request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client for all price providers
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("mtrack/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// URLs are stripped from the message since some providers carry the API key in the path.
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() || err.is_body() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

/// Sends `request` once and decodes a successful response body as JSON.
pub async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    debug!(%status, "Received provider response");

    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))
}
