//! Configuration management
//!
//! Behaviour comes from a YAML file; secrets only ever come from the
//! environment and are checked once at startup.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;

pub const ENV_BOT_ID: &str = "BOT_ID";
pub const ENV_SLACK_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_WEATHER_KEY: &str = "OPENWEATHERMAP_APIKEY";
pub const ENV_GEOCODING_KEY: &str = "GMAPS_APIKEY";

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub slack: SlackConfig,
    pub providers: ProvidersConfig,
    pub commute: CommuteConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub example_command: String,
    pub poll_interval_ms: u64,
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProvidersConfig {
    pub weather_url: String,
    pub geocoding_url: String,
    pub comic_url: String,
}

/// Evening commute weather: city keywords and the daily broadcast
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommuteConfig {
    pub locations: Vec<CommuteLocation>,
    /// Local wall-clock time after which the broadcast fires; `None` disables it
    pub broadcast_time: Option<NaiveTime>,
    pub targets: Vec<BroadcastTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommuteLocation {
    pub keyword: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BroadcastTarget {
    pub label: String,
    pub channel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "andy_bot".to_string(),
                example_command: "do".to_string(),
                poll_interval_ms: 1000,
                read_timeout_ms: 500,
            },
            slack: SlackConfig {
                api_url: "https://slack.com/api".to_string(),
            },
            providers: ProvidersConfig {
                weather_url: "http://api.openweathermap.org/data/2.5/weather".to_string(),
                geocoding_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
                comic_url: "https://xkcd.com".to_string(),
            },
            commute: CommuteConfig {
                locations: vec![
                    CommuteLocation {
                        keyword: "nyc".to_string(),
                        location: "brooklyn, new york".to_string(),
                    },
                    CommuteLocation {
                        keyword: "denver".to_string(),
                        location: "denver, colorado".to_string(),
                    },
                ],
                broadcast_time: NaiveTime::from_hms_opt(16, 45, 0),
                targets: vec![
                    BroadcastTarget {
                        label: "nyc".to_string(),
                        channel: "C0AF8Q25N".to_string(),
                    },
                    BroadcastTarget {
                        label: "denver".to_string(),
                        channel: "C0AF8Q25N".to_string(),
                    },
                ],
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load the file if it exists, fall back to defaults otherwise
    pub fn load_or_default(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("bot.poll-interval-ms must be > 0".to_string()));
        }
        if self.bot.example_command.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.example-command is empty".to_string()));
        }
        for target in &self.commute.targets {
            if self.commute_location(&target.label).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "broadcast target '{}' has no commute location",
                    target.label
                )));
            }
        }
        Ok(())
    }

    pub fn commute_location(&self, keyword: &str) -> Option<&str> {
        self.commute.locations.iter()
            .find(|l| l.keyword == keyword)
            .map(|l| l.location.as_str())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.bot.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.bot.read_timeout_ms)
    }
}

/// Secrets read from the environment
#[derive(Clone)]
pub struct Credentials {
    pub bot_id: Option<String>,
    pub slack_token: Option<String>,
    pub weather_api_key: String,
    pub geocoding_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_id", &self.bot_id)
            .field("slack_token", &self.slack_token.as_ref().map(|_| "***"))
            .field("weather_api_key", &"***")
            .field("geocoding_api_key", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn from_env(require_slack: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(require_slack, |key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as missing
    pub fn from_lookup<F>(require_slack: bool, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingField(key.to_string()));

        let (bot_id, slack_token) = if require_slack {
            (Some(require(ENV_BOT_ID)?), Some(require(ENV_SLACK_TOKEN)?))
        } else {
            (get(ENV_BOT_ID), get(ENV_SLACK_TOKEN))
        };

        Ok(Self {
            bot_id,
            slack_token,
            weather_api_key: require(ENV_WEATHER_KEY)?,
            geocoding_api_key: require(ENV_GEOCODING_KEY)?,
        })
    }
}
