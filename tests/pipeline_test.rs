//! End-to-end: transport events through filter, router and HTTP providers
//! Run with: cargo test --test pipeline_test

use async_trait::async_trait;
use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use andybot::application::errors::TransportError;
use andybot::application::messaging::{CommandRouter, EventFilter};
use andybot::application::services::Scheduler;
use andybot::domain::entities::{InboundEvent, Reply};
use andybot::domain::traits::Transport;
use andybot::infrastructure::config::Config;
use andybot::infrastructure::providers::{GoogleGeocoder, OpenWeatherMap, XkcdComics};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[derive(Default)]
struct Wire {
    inbound: VecDeque<Vec<InboundEvent>>,
    outbound: Vec<Reply>,
}

struct ScriptedTransport(Arc<Mutex<Wire>>);

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn read_events(&mut self) -> Result<Vec<InboundEvent>, TransportError> {
        Ok(self.0.lock().unwrap().inbound.pop_front().unwrap_or_default())
    }

    async fn post_message(&mut self, channel: &str, text: &str) -> Result<(), TransportError> {
        self.0.lock().unwrap().outbound.push(Reply::new(channel, text));
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn config_for(server: &mockito::ServerGuard) -> Config {
    let mut config = Config::default();
    config.providers.weather_url = format!("{}/data/2.5/weather", server.url());
    config.providers.geocoding_url = format!("{}/maps/api/geocode/json", server.url());
    config.providers.comic_url = format!("{}/xkcd", server.url());
    config
}

fn scheduler(config: &Config, wire: Arc<Mutex<Wire>>) -> Scheduler {
    let client = Client::new();
    let router = CommandRouter::new(
        config,
        Arc::new(OpenWeatherMap::new(client.clone(), &config.providers.weather_url, "owm-key")),
        Arc::new(GoogleGeocoder::new(client.clone(), &config.providers.geocoding_url, "maps-key")),
        Arc::new(XkcdComics::with_rng(client, &config.providers.comic_url, StdRng::seed_from_u64(11))),
    );
    Scheduler::new(
        Box::new(ScriptedTransport(wire)),
        EventFilter::new("U0ANDY"),
        router,
        config,
    )
}

fn morning() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).unwrap()
}

#[tokio::test]
async fn test_weather_mention_round_trip() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;
    let weather = server
        .mock("GET", mockito::Matcher::Regex("^/data/2.5/weather".to_string()))
        .match_query(mockito::Matcher::UrlEncoded("q".into(), "manila, philippines".into()))
        .with_status(200)
        .with_body(r#"{"name":"Manila","weather":[{"main":"Rain","description":"light rain"}],
                      "main":{"temp":303.7,"temp_max":305.0,"temp_min":300.0}}"#)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let wire = Arc::new(Mutex::new(Wire::default()));
    wire.lock().unwrap().inbound.push_back(vec![
        InboundEvent::presence_change(),
        InboundEvent::message("C77", "<@U0ANDY>: Weather Manila, Philippines"),
    ]);

    let mut bot = scheduler(&config, wire.clone());
    bot.tick(morning()).await.unwrap();

    weather.assert_async().await;
    let outbound = wire.lock().unwrap().outbound.clone();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].channel, "C77");
    assert!(outbound[0].text.starts_with("Weather in *Manila*"));
    assert!(outbound[0].text.ends_with("Enjoy!"));
}

#[tokio::test]
async fn test_provider_outage_is_reported_inline() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;
    let _geocode = server
        .mock("GET", mockito::Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let config = config_for(&server);
    let wire = Arc::new(Mutex::new(Wire::default()));
    wire.lock().unwrap().inbound.push_back(vec![InboundEvent::message(
        "C1",
        "<@U0ANDY>: latlng 201 moore street, brooklyn, ny",
    )]);

    let mut bot = scheduler(&config, wire.clone());
    bot.tick(morning()).await.unwrap();

    let outbound = wire.lock().unwrap().outbound.clone();
    assert_eq!(
        outbound,
        vec![Reply::new("C1", "Failed to get Lat/Lng from Google Maps service")]
    );
}

#[tokio::test]
async fn test_commute_broadcast_hits_weather_once_per_city() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;
    let body = r#"{"name":"X","weather":[{"main":"Clear","description":"clear sky"}],
                   "main":{"temp":280.0,"temp_max":281.0,"temp_min":279.0}}"#;
    let nyc = server
        .mock("GET", mockito::Matcher::Regex("^/data/2.5/weather".to_string()))
        .match_query(mockito::Matcher::UrlEncoded("q".into(), "brooklyn, new york".into()))
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;
    let denver = server
        .mock("GET", mockito::Matcher::Regex("^/data/2.5/weather".to_string()))
        .match_query(mockito::Matcher::UrlEncoded("q".into(), "denver, colorado".into()))
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let wire = Arc::new(Mutex::new(Wire::default()));
    let mut bot = scheduler(&config, wire.clone());

    for minute in [50, 51, 52] {
        bot.tick(NaiveTime::from_hms_opt(16, minute, 0).unwrap()).await.unwrap();
    }

    nyc.assert_async().await;
    denver.assert_async().await;
    let outbound = wire.lock().unwrap().outbound.clone();
    assert_eq!(outbound.len(), 2);
    assert!(outbound.iter().all(|r| r.text.starts_with("*Your evening commute weather!*")));
    assert!(bot.state().last_broadcast_sent);
}
