//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod event;
pub mod reply;

pub use command::{Addressed, Command, CommandRegistry, CommandSpec};
pub use event::{EventType, InboundEvent};
pub use reply::Reply;
