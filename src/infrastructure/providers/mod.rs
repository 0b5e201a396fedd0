//! Provider adapters - one per external data source

pub mod comic;
pub mod geocoding;
pub mod greeting;
pub mod weather;

pub use comic::{pick_random_id, XkcdComics};
pub use geocoding::GoogleGeocoder;
pub use greeting::Greeter;
pub use weather::OpenWeatherMap;

use reqwest::Client;
use serde::de::DeserializeOwned;
use crate::application::errors::ProviderError;

/// Shared HTTP client for all providers
pub fn http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(concat!("andybot/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Network)
}

/// GET a JSON document. Non-2xx and undecodable bodies are errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let response = client.get(url).query(query).send().await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status()));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
}
