//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Messaging: Mention filtering and command routing
//! - Services: The scheduler loop
pub mod errors;
pub mod messaging;
pub mod services;
