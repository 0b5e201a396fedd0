//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Providers: HTTP adapters for weather, geocoding and comics
//! - Adapters: Chat transports (Slack, console)

pub mod adapters;
pub mod config;
pub mod providers;
