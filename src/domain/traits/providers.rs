//! Provider traits - one per external data source.
//!
//! Implementations never fail: transport and payload errors are turned
//! into user-facing text before they leave the adapter.

use async_trait::async_trait;

#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Current conditions for a free-text location
    async fn current_weather(&self, location: &str) -> String;
}

#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Latitude/longitude of the first match for a free-text place query
    async fn lookup(&self, query: &str) -> String;
}

#[async_trait]
pub trait ComicService: Send + Sync {
    /// The newest comic when `latest`, otherwise a random one
    async fn comic(&self, latest: bool) -> String;
}
