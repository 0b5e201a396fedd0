//! Console adapter for development/testing
//!
//! Each stdin line becomes a message event in the `console` channel.
//! Lines without the mention marker are treated as addressed to the bot.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::errors::TransportError;
use crate::domain::entities::InboundEvent;
use crate::domain::traits::Transport;

pub const CHANNEL: &str = "console";

/// Turn a typed line into the event Slack would have delivered
pub fn line_to_event(mention: &str, line: &str) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let text = if line.contains(mention) {
        line.to_string()
    } else {
        format!("{} {}", mention, line)
    };
    Some(InboundEvent::message(CHANNEL, text))
}

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    mention: String,
    read_timeout: Duration,
    lines: Option<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(mention: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            mention: mention.into(),
            read_timeout,
            lines: None,
        }
    }
}

#[async_trait]
impl Transport for ConsoleAdapter {
    async fn connect(&mut self) -> Result<(), TransportError> {
        tracing::info!("Starting console bot (dev mode)");
        println!("Type a command (e.g. `help`), Ctrl-D to quit.");
        self.lines = Some(BufReader::new(tokio::io::stdin()).lines());
        Ok(())
    }

    async fn read_events(&mut self) -> Result<Vec<InboundEvent>, TransportError> {
        let lines = self.lines.as_mut().ok_or(TransportError::Closed)?;

        match tokio::time::timeout(self.read_timeout, lines.next_line()).await {
            Err(_) => Ok(Vec::new()),
            Ok(Ok(Some(line))) => Ok(line_to_event(&self.mention, &line).into_iter().collect()),
            Ok(Ok(None)) => {
                self.lines = None;
                Err(TransportError::Closed)
            }
            Ok(Err(e)) => Err(TransportError::Receive(e.to_string())),
        }
    }

    async fn post_message(&mut self, _channel: &str, text: &str) -> Result<(), TransportError> {
        println!("[BOT] {}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }

    fn close_is_expected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_addressed() {
        let event = line_to_event("<@U1>:", "  xkcd latest ").unwrap();
        assert_eq!(event, InboundEvent::message(CHANNEL, "<@U1>: xkcd latest"));
    }

    #[test]
    fn test_line_with_mention_kept() {
        let event = line_to_event("<@U1>:", "hey <@U1>: help").unwrap();
        assert_eq!(event.text.as_deref(), Some("hey <@U1>: help"));
    }

    #[test]
    fn test_blank_line_ignored() {
        assert!(line_to_event("<@U1>:", "   ").is_none());
    }

    #[tokio::test]
    async fn test_read_before_connect_is_closed() {
        let mut console = ConsoleAdapter::new("<@U1>:", Duration::from_millis(1));
        assert_eq!(console.read_events().await, Err(TransportError::Closed));
        assert!(console.post_message(CHANNEL, "hi").await.is_ok());
        assert!(console.close_is_expected());
    }
}
