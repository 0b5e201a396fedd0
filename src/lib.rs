//! andybot - a Slack bot that answers weather, geocoding and xkcd requests

pub mod application;
pub mod domain;
pub mod infrastructure;
