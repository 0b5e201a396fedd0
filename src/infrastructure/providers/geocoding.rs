//! Google Maps geocoding

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::errors::ProviderError;
use crate::domain::traits::GeocodingService;

pub const USAGE: &str = "Specify a place: `latlng 201 moore street, brooklyn, ny`";
pub const FAILURE: &str = "Failed to get Lat/Lng from Google Maps service";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub fn not_found_message(query: &str) -> String {
    format!("Couldn't find a place matching *{}*.", query)
}

pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch(&self, query: &str) -> Result<String, ProviderError> {
        tracing::debug!("Geocoding request: {}?address={}", self.base_url, query);
        let response: GeocodeResponse = super::get_json(
            &self.client,
            &self.base_url,
            &[("address", query), ("key", self.api_key.as_str())],
        )
        .await?;

        match response.status.as_deref() {
            None | Some("OK") => {}
            Some("ZERO_RESULTS") => return Err(ProviderError::NotFound("ZERO_RESULTS".to_string())),
            Some(status) => {
                let detail = response.error_message.as_deref().unwrap_or("no detail");
                return Err(ProviderError::Api(format!("{} ({})", status, detail)));
            }
        }

        let Some(first) = response.results.first() else {
            return Err(ProviderError::NotFound("no results".to_string()));
        };

        Ok(format!(
            "*{},{}* is the lat/lng of *{}*.",
            first.geometry.location.lat, first.geometry.location.lng, first.formatted_address
        ))
    }
}

#[async_trait]
impl GeocodingService for GoogleGeocoder {
    async fn lookup(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return USAGE.to_string();
        }

        match self.fetch(query).await {
            Ok(text) => text,
            Err(ProviderError::NotFound(status)) => {
                tracing::info!("No geocoding match for '{}' ({})", query, status);
                not_found_message(query)
            }
            Err(e) => {
                tracing::warn!("Failed to get Lat/Long from Google Maps service: {}", e);
                FAILURE.to_string()
            }
        }
    }
}
