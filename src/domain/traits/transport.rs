use async_trait::async_trait;
use crate::application::errors::TransportError;
use crate::domain::entities::InboundEvent;

/// Transport trait - abstraction for the real-time chat connection
#[async_trait]
pub trait Transport: Send {
    /// Open the session; failure here is fatal at startup
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Read the events available right now, waiting at most the transport's
    /// read timeout. An empty batch is not an error.
    async fn read_events(&mut self) -> Result<Vec<InboundEvent>, TransportError>;

    /// Post a message to a channel
    async fn post_message(&mut self, channel: &str, text: &str) -> Result<(), TransportError>;

    /// Transport name for logging
    fn name(&self) -> &str;

    /// Whether `Closed` is a normal end of input (console EOF) rather than
    /// a lost session
    fn close_is_expected(&self) -> bool {
        false
    }
}
