//! Event filter - Keeps only events that mention the bot

use crate::domain::entities::{Addressed, Command, InboundEvent};

/// Picks the command addressed to this bot out of a batch of events
#[derive(Debug, Clone)]
pub struct EventFilter {
    mention: String,
}

impl EventFilter {
    pub fn new(bot_id: &str) -> Self {
        Self {
            mention: format!("<@{}>:", bot_id),
        }
    }

    /// The literal mention marker, e.g. `<@U024BE7LH>:`
    pub fn mention(&self) -> &str {
        &self.mention
    }

    /// At most one command per batch; the last qualifying event wins
    pub fn extract(&self, events: &[InboundEvent]) -> Option<Addressed> {
        for event in events.iter().filter(|e| !e.is_presence_change()) {
            tracing::debug!("Event intercepted: {:?}", event);
        }

        events.iter().filter_map(|e| self.addressed(e)).last()
    }

    fn addressed(&self, event: &InboundEvent) -> Option<Addressed> {
        let text = event.text.as_deref()?;
        let channel = event.channel.as_deref()?;

        // text between the first mention and any second one
        let after = text.split(self.mention.as_str()).nth(1)?;
        let command = Command::parse(&after.trim().to_lowercase())?;

        Some(Addressed {
            command,
            channel: channel.to_string(),
        })
    }
}
