//! Platform adapters implementing the chat transport

pub mod console;
pub mod slack;

pub use console::ConsoleAdapter;
pub use slack::SlackAdapter;
