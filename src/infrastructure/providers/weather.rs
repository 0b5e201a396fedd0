//! OpenWeatherMap current conditions

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::errors::ProviderError;
use crate::domain::traits::WeatherService;

pub const USAGE: &str = "Specify a place for weather: `weather manila, philippines`";

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    weather: Vec<Condition>,
    main: Readings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
    temp_max: f64,
    temp_min: f64,
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin * 1.8 - 459.67
}

/// Whole degrees, truncated toward zero
fn whole_fahrenheit(kelvin: f64) -> i64 {
    kelvin_to_fahrenheit(kelvin) as i64
}

pub fn clothing_advice(temp_f: i64) -> &'static str {
    if temp_f < 45 {
        "Wear something really warm!"
    } else if temp_f < 60 {
        "Take a sweater!"
    } else {
        "Enjoy!"
    }
}

pub fn failure_message(location: &str) -> String {
    format!("Failed to get weather information for {}", location)
}

fn render(report: &WeatherResponse) -> Result<String, ProviderError> {
    let condition = report.weather.first()
        .ok_or_else(|| ProviderError::Parse("no weather conditions in response".to_string()))?;
    let temp = whole_fahrenheit(report.main.temp);

    Ok(format!(
        "Weather in *{name}*\n\
         >Temperature: *{temp}° F*\n\
         >High temp: *{hi}° F*\n\
         >Low temp: *{lo}° F*\n\
         >Conditions: *{main} ({description})*\n\
         {advice}",
        name = report.name,
        temp = temp,
        hi = whole_fahrenheit(report.main.temp_max),
        lo = whole_fahrenheit(report.main.temp_min),
        main = condition.main,
        description = condition.description,
        advice = clothing_advice(temp),
    ))
}

/// Weather adapter backed by the OpenWeatherMap current-weather endpoint
pub struct OpenWeatherMap {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMap {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch(&self, location: &str) -> Result<String, ProviderError> {
        tracing::debug!("Weather request: {}?q={}", self.base_url, location);
        let report: WeatherResponse = super::get_json(
            &self.client,
            &self.base_url,
            &[("q", location), ("APPID", self.api_key.as_str())],
        )
        .await?;
        render(&report)
    }
}

#[async_trait]
impl WeatherService for OpenWeatherMap {
    async fn current_weather(&self, location: &str) -> String {
        let location = location.trim();
        if location.is_empty() {
            return USAGE.to_string();
        }

        match self.fetch(location).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to get weather information: {}", e);
                failure_message(location)
            }
        }
    }
}
