//! Domain layer - Core bot types with no knowledge of Slack or HTTP
//!
//! This layer contains:
//! - Entities: Inbound events, commands, replies, the help registry
//! - Traits: Abstractions for the transport and the data providers

pub mod entities;
pub mod traits;
