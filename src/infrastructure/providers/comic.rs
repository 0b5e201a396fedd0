//! xkcd comics

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;

use crate::application::errors::ProviderError;
use crate::domain::traits::ComicService;

pub const FAILURE: &str = "Failed to retrieve comic :(";

#[derive(Debug, Deserialize)]
struct LatestInfo {
    num: u32,
}

#[derive(Debug, Deserialize)]
struct ComicInfo {
    safe_title: String,
    month: String,
    day: String,
    year: String,
    img: String,
    alt: String,
}

/// Uniform comic id in `[1, max]`. `max` of zero is treated as one.
pub fn pick_random_id<R: Rng>(rng: &mut R, max: u32) -> u32 {
    rng.gen_range(1..=max.max(1))
}

fn render(comic: &ComicInfo) -> String {
    format!(
        "*{}*\n({}/{}/{})\n{}\n_{}_",
        comic.safe_title, comic.month, comic.day, comic.year, comic.img, comic.alt
    )
}

/// Comic adapter for the xkcd JSON interface
pub struct XkcdComics<R = StdRng> {
    client: Client,
    base_url: String,
    rng: Mutex<R>,
}

impl XkcdComics<StdRng> {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self::with_rng(client, base_url, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> XkcdComics<R> {
    pub fn with_rng(client: Client, base_url: impl Into<String>, rng: R) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rng: Mutex::new(rng),
        }
    }

    async fn latest_id(&self) -> Result<u32, ProviderError> {
        let url = format!("{}/info.0.json", self.base_url);
        let info: LatestInfo = super::get_json(&self.client, &url, &[]).await?;
        tracing::debug!("Most recent comic: {}", info.num);
        Ok(info.num)
    }

    fn choose(&self, max: u32) -> Result<u32, ProviderError> {
        let mut rng = self.rng.lock()
            .map_err(|_| ProviderError::Parse("comic rng lock poisoned".to_string()))?;
        Ok(pick_random_id(&mut *rng, max))
    }

    async fn fetch(&self, latest: bool) -> Result<String, ProviderError> {
        let max = self.latest_id().await?;
        if max == 0 {
            return Err(ProviderError::NotFound("no comics published".to_string()));
        }
        let id = if latest { max } else { self.choose(max)? };
        tracing::debug!("Comic chosen: {}", id);

        let url = format!("{}/{}/info.0.json", self.base_url, id);
        let comic: ComicInfo = super::get_json(&self.client, &url, &[]).await?;
        Ok(render(&comic))
    }
}

#[async_trait]
impl<R: Rng + Send> ComicService for XkcdComics<R> {
    async fn comic(&self, latest: bool) -> String {
        match self.fetch(latest).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to retrieve comic: {}", e);
                FAILURE.to_string()
            }
        }
    }
}
