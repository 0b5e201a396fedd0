//! Command router - Maps command text to a provider and a reply
//!
//! Rules are checked in a fixed order and the first match wins. The router
//! is total: every input produces a reply string.

use std::sync::Arc;

use crate::domain::entities::CommandRegistry;
use crate::domain::traits::{ComicService, GeocodingService, WeatherService};
use crate::infrastructure::config::{CommuteLocation, Config};
use crate::infrastructure::providers::Greeter;

pub const EXAMPLE_REPLY: &str = "Sure...write some more code then I can do that!";
pub const COMMUTE_BANNER: &str = "*Your evening commute weather!*\n\n";
pub const NO_RESPONSE: &str = "I'm not sure how to respond to that.";

pub struct CommandRouter {
    bot_name: String,
    example_verb: String,
    registry: CommandRegistry,
    commute: Vec<CommuteLocation>,
    weather: Arc<dyn WeatherService>,
    geocoder: Arc<dyn GeocodingService>,
    comics: Arc<dyn ComicService>,
    greeter: Greeter,
}

impl CommandRouter {
    pub fn new(
        config: &Config,
        weather: Arc<dyn WeatherService>,
        geocoder: Arc<dyn GeocodingService>,
        comics: Arc<dyn ComicService>,
    ) -> Self {
        let example_verb = config.bot.example_command.trim().to_lowercase();
        Self {
            bot_name: config.bot.name.clone(),
            registry: CommandRegistry::defaults(&example_verb),
            example_verb,
            commute: config.commute.locations.clone(),
            weather,
            geocoder,
            comics,
            greeter: Greeter::new(),
        }
    }

    pub fn with_greeter(mut self, greeter: Greeter) -> Self {
        self.greeter = greeter;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Resolve a normalized command into reply text
    pub async fn dispatch(&self, text: &str) -> String {
        let text = text.trim();
        tracing::debug!("Dispatching: {}", text);

        if text.starts_with(self.example_verb.as_str()) {
            return EXAMPLE_REPLY.to_string();
        }
        if let Some(rest) = text.strip_prefix("weather") {
            return self.weather(text, rest).await;
        }
        if text.starts_with("xkcd") {
            return self.comics.comic(text.contains("latest")).await;
        }
        if text.starts_with("help") {
            return self.help();
        }
        if let Some(rest) = text.strip_prefix("latlong").or_else(|| text.strip_prefix("latlng")) {
            return self.geocoder.lookup(rest.trim()).await;
        }
        if text.to_lowercase().contains("morning") {
            return self.greeter.greet(text).unwrap_or_else(|| NO_RESPONSE.to_string());
        }

        self.fallback()
    }

    async fn weather(&self, text: &str, rest: &str) -> String {
        if !text.contains("evening commute") {
            return self.weather.current_weather(rest.trim()).await;
        }

        let Some(commute) = self.commute.iter().find(|c| text.contains(c.keyword.as_str())) else {
            tracing::info!("No commute location in '{}'", text);
            return NO_RESPONSE.to_string();
        };

        let report = self.weather.current_weather(&commute.location).await;
        format!("{}{}", COMMUTE_BANNER, report)
    }

    /// Every registry entry as usage / example / response, in order
    pub fn help(&self) -> String {
        let mut help = format!(
            "@{name} tries to help!\n\n\
             Summon me like this: `@{name}: command`\n\n\
             Available commands are:\n\n",
            name = self.bot_name
        );
        for spec in self.registry.all() {
            help.push_str(&format!(
                "*{}*\n> Example: _{}_\n> Response: _{}_\n",
                spec.usage, spec.example, spec.explanation
            ));
        }
        help
    }

    fn fallback(&self) -> String {
        format!(
            "Not sure what you mean. Use the *{}* command with numbers, delimited by spaces.",
            self.example_verb
        )
    }
}
