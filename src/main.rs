use clap::{Parser, Subcommand};
use std::sync::Arc;

use andybot::application::errors::{BotError, ConfigError};
use andybot::application::messaging::{CommandRouter, EventFilter};
use andybot::application::services::Scheduler;
use andybot::domain::traits::Transport;
use andybot::infrastructure::adapters::{ConsoleAdapter, SlackAdapter};
use andybot::infrastructure::config::{Config, Credentials, ENV_SLACK_TOKEN};
use andybot::infrastructure::providers::{self, GoogleGeocoder, OpenWeatherMap, XkcdComics};

/// Bot id used for the mention marker when none is configured (console mode)
const CONSOLE_BOT_ID: &str = "andybot";

#[derive(Parser)]
#[command(name = "andybot")]
#[command(about = "A Slack bot for weather, lat/lng lookups and xkcd", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Read commands from stdin instead of Slack
        #[arg(long)]
        console: bool,
    },
    /// Dispatch one command and print the reply
    Ask {
        /// Command text, e.g. `weather denver`
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show version
    Version,
    /// Print the default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { console } => run_bot(&cli.config, console),
        Commands::Ask { text } => ask(&cli.config, &text.join(" ")),
        Commands::Version => {
            println!("andybot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, BotError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

/// Wire the HTTP providers into a router
fn build_router(config: &Config, credentials: &Credentials) -> Result<CommandRouter, BotError> {
    let client = providers::http_client()?;

    let weather = OpenWeatherMap::new(
        client.clone(),
        &config.providers.weather_url,
        &credentials.weather_api_key,
    );
    let geocoder = GoogleGeocoder::new(
        client.clone(),
        &config.providers.geocoding_url,
        &credentials.geocoding_api_key,
    );
    let comics = XkcdComics::new(client, &config.providers.comic_url);

    Ok(CommandRouter::new(config, Arc::new(weather), Arc::new(geocoder), Arc::new(comics)))
}

fn run_bot(config_path: &str, console: bool) -> Result<(), BotError> {
    let config = Config::load_or_default(config_path)?;
    let credentials = Credentials::from_env(!console)?;
    let router = build_router(&config, &credentials)?;

    let bot_id = credentials.bot_id.as_deref().unwrap_or(CONSOLE_BOT_ID);
    let filter = EventFilter::new(bot_id);

    let transport: Box<dyn Transport> = if console {
        Box::new(ConsoleAdapter::new(filter.mention(), config.read_timeout()))
    } else {
        let token = credentials.slack_token.clone()
            .ok_or_else(|| ConfigError::MissingField(ENV_SLACK_TOKEN.to_string()))?;
        Box::new(
            SlackAdapter::new(
                providers::http_client()?,
                &config.slack.api_url,
                token,
                config.read_timeout(),
            )
            .with_bot_id(bot_id),
        )
    };

    tracing::info!("Starting {} as <@{}> on {}", config.bot.name, bot_id, transport.name());
    let mut scheduler = Scheduler::new(transport, filter, router, &config);
    runtime()?.block_on(scheduler.run())
}

fn ask(config_path: &str, text: &str) -> Result<(), BotError> {
    let config = Config::load_or_default(config_path)?;
    let credentials = Credentials::from_env(false)?;
    let router = build_router(&config, &credentials)?;

    let reply = runtime()?.block_on(router.dispatch(&text.trim().to_lowercase()));
    println!("{}", reply);
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
