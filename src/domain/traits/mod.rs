//! Domain traits - Abstractions for infrastructure implementations

pub mod providers;
pub mod transport;

pub use providers::{ComicService, GeocodingService, WeatherService};
pub use transport::Transport;
