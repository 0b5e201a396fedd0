//! Application services - The polling loop that drives the bot

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerState};
