//! Scheduler loop - Single-threaded polling of the transport
//!
//! Every call (read, provider, post) is awaited in sequence, so a slow
//! provider stalls the whole loop. That is the throughput ceiling of the bot.

use chrono::{Local, NaiveTime};
use std::time::Duration;

use crate::application::errors::{BotError, TransportError};
use crate::application::messaging::{CommandRouter, EventFilter};
use crate::domain::entities::Reply;
use crate::domain::traits::Transport;
use crate::infrastructure::config::{BroadcastTarget, Config};

/// Process-lifetime state, reset only by a restart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub last_broadcast_sent: bool,
}

pub struct Scheduler {
    transport: Box<dyn Transport>,
    filter: EventFilter,
    router: CommandRouter,
    broadcast_time: Option<NaiveTime>,
    targets: Vec<BroadcastTarget>,
    poll_interval: Duration,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(
        transport: Box<dyn Transport>,
        filter: EventFilter,
        router: CommandRouter,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            filter,
            router,
            broadcast_time: config.commute.broadcast_time,
            targets: config.commute.targets.clone(),
            poll_interval: config.poll_interval(),
            state: SchedulerState::default(),
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Connect, then poll until the transport closes or Ctrl-C arrives.
    /// A close the transport does not expect is returned as an error.
    pub async fn run(&mut self) -> Result<(), BotError> {
        self.transport.connect().await?;
        tracing::info!("{} connected and running!", self.transport.name());

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            match self.tick(Local::now().time()).await {
                Ok(()) => {}
                Err(TransportError::Closed) if self.transport.close_is_expected() => {
                    tracing::info!("{} input ended, stopping", self.transport.name());
                    return Ok(());
                }
                Err(TransportError::Closed) => {
                    tracing::error!("{} session closed unexpectedly", self.transport.name());
                    return Err(TransportError::Closed.into());
                }
                Err(e) => return Err(e.into()),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    /// One loop iteration. Only a closed transport is returned as an error;
    /// read and post failures are logged and the loop carries on.
    pub async fn tick(&mut self, now: NaiveTime) -> Result<(), TransportError> {
        match self.transport.read_events().await {
            Ok(events) => {
                if let Some(addressed) = self.filter.extract(&events) {
                    let text = addressed.command.text();
                    tracing::info!("command '{}' channel {}", text, addressed.channel);
                    self.handle_command(&text, &addressed.channel).await;
                }
            }
            Err(TransportError::Closed) => return Err(TransportError::Closed),
            Err(e) => tracing::error!("Failed to read events: {}", e),
        }

        if self.broadcast_due(now) {
            self.broadcast().await;
        }
        Ok(())
    }

    /// Route a command and post the reply to `channel`
    pub async fn handle_command(&mut self, text: &str, channel: &str) -> Reply {
        let reply = Reply::new(channel, self.router.dispatch(text).await);
        tracing::info!(
            "Sending response to channel {}: {}",
            reply.channel,
            reply.text.chars().take(100).collect::<String>()
        );
        if let Err(e) = self.transport.post_message(&reply.channel, &reply.text).await {
            tracing::error!("Failed to send message: {}", e);
        }
        reply
    }

    fn broadcast_due(&self, now: NaiveTime) -> bool {
        !self.state.last_broadcast_sent
            && !self.targets.is_empty()
            && self.broadcast_time.is_some_and(|at| now > at)
    }

    async fn broadcast(&mut self) {
        tracing::info!("Sending evening commute weather to {} targets", self.targets.len());
        for target in self.targets.clone() {
            let text = format!("weather evening commute {}", target.label);
            self.handle_command(&text, &target.channel).await;
        }
        self.state.last_broadcast_sent = true;
    }
}
