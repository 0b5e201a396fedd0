//! Message handling - Filtering mentions and routing commands

pub mod filter;
pub mod router;

pub use filter::EventFilter;
pub use router::CommandRouter;
