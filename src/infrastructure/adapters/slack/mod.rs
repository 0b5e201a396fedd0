//! Slack adapter - RTM websocket for reading, Web API for posting

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::application::errors::TransportError;
use crate::domain::entities::InboundEvent;
use crate::domain::traits::Transport;

/// Upper bound on frames drained in one poll
const MAX_FRAMES_PER_READ: usize = 64;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Status fields every Web API method returns
#[derive(Debug, Deserialize)]
struct ApiStatus {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl ApiStatus {
    fn error(self) -> String {
        self.error.unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RtmConnect {
    #[serde(flatten)]
    status: ApiStatus,
    #[serde(default)]
    url: Option<String>,
    #[serde(rename = "self", default)]
    identity: Option<Identity>,
}

#[derive(Debug, Deserialize)]
struct Identity {
    id: String,
    name: String,
}

/// Decode one RTM frame. Frames that are not JSON objects are dropped.
pub fn parse_frame(text: &str) -> Option<InboundEvent> {
    match serde_json::from_str::<InboundEvent>(text) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("Skipping undecodable frame: {}", e);
            None
        }
    }
}

/// True when no id is configured or it equals the authenticated one
fn identity_matches(expected: Option<&str>, actual: &str) -> bool {
    expected.map_or(true, |id| id == actual)
}

/// Slack bot adapter
pub struct SlackAdapter {
    client: Client,
    api_url: String,
    token: String,
    read_timeout: Duration,
    socket: Option<Socket>,
    expected_bot_id: Option<String>,
}

impl SlackAdapter {
    pub fn new(client: Client, api_url: impl Into<String>, token: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            read_timeout,
            socket: None,
            expected_bot_id: None,
        }
    }

    /// The id the mention filter listens for; checked against `rtm.connect`
    pub fn with_bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.expected_bot_id = Some(bot_id.into());
        self
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }

    /// Ask the Web API for a websocket URL
    async fn rtm_connect(&self) -> Result<(String, Identity), TransportError> {
        let response = self.client
            .post(self.api_url("rtm.connect"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Connect(format!("Slack API error: {}", response.status())));
        }

        let data: RtmConnect = response
            .json()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        if !data.status.ok {
            return Err(TransportError::Auth(data.status.error()));
        }
        match (data.url, data.identity) {
            (Some(url), Some(identity)) => Ok((url, identity)),
            _ => Err(TransportError::Connect("rtm.connect returned no session".to_string())),
        }
    }
}

#[async_trait]
impl Transport for SlackAdapter {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let (url, identity) = self.rtm_connect().await?;
        tracing::info!("Authenticated as @{} ({})", identity.name, identity.id);
        if !identity_matches(self.expected_bot_id.as_deref(), &identity.id) {
            tracing::warn!(
                "Token belongs to {} but mentions are matched for {}; commands will be ignored",
                identity.id,
                self.expected_bot_id.as_deref().unwrap_or_default()
            );
        }

        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        self.socket = Some(socket);
        Ok(())
    }

    async fn read_events(&mut self) -> Result<Vec<InboundEvent>, TransportError> {
        let socket = self.socket.as_mut().ok_or(TransportError::Closed)?;
        let mut events = Vec::new();
        // wait for the first frame, then only drain what is already buffered
        let mut wait = self.read_timeout;

        for _ in 0..MAX_FRAMES_PER_READ {
            let frame = match tokio::time::timeout(wait, socket.next()).await {
                Err(_) => break,
                Ok(None) => {
                    self.socket = None;
                    return Err(TransportError::Closed);
                }
                Ok(Some(Err(e))) => return Err(TransportError::Receive(e.to_string())),
                Ok(Some(Ok(frame))) => frame,
            };
            wait = Duration::ZERO;

            match frame {
                Message::Text(text) => events.extend(parse_frame(text.as_str())),
                Message::Close(reason) => {
                    tracing::info!("Slack closed the socket: {:?}", reason);
                    self.socket = None;
                    return Err(TransportError::Closed);
                }
                _ => {}
            }
        }

        Ok(events)
    }

    async fn post_message(&mut self, channel: &str, text: &str) -> Result<(), TransportError> {
        #[derive(Serialize)]
        struct PostMessageRequest<'a> {
            channel: &'a str,
            text: &'a str,
            as_user: bool,
        }

        let response = self.client
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&PostMessageRequest { channel, text, as_user: true })
            .send()
            .await
            .map_err(|e| TransportError::Post(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Post(format!("Slack API error: {}", response.status())));
        }

        let status: ApiStatus = response
            .json()
            .await
            .map_err(|e| TransportError::Post(e.to_string()))?;

        if !status.ok {
            return Err(TransportError::Post(status.error()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::SinkExt;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn adapter(server: &mockito::ServerGuard) -> SlackAdapter {
        SlackAdapter::new(Client::new(), format!("{}/api", server.url()), "xoxb-test", Duration::from_millis(10))
    }

    #[test]
    fn test_parse_frames() {
        let event = parse_frame(r#"{"type":"message","channel":"C2147483705","user":"U2147483697","text":"<@U1>: help","ts":"1355517523.000005"}"#).unwrap();
        assert_eq!(event, InboundEvent::message("C2147483705", "<@U1>: help"));

        let hello = parse_frame(r#"{"type":"hello"}"#).unwrap();
        assert!(hello.text.is_none());

        assert!(parse_frame("not json").is_none());
        assert!(parse_frame("[1,2,3]").is_none());
    }

    #[tokio::test]
    async fn test_connect_rejected_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/rtm.connect")
            .match_header("authorization", "Bearer xoxb-test")
            .with_status(200)
            .with_body(r#"{"ok": false, "error": "invalid_auth"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut slack = adapter(&server);
        let err = slack.connect().await.unwrap_err();
        mock.assert_async().await;
        assert_eq!(err, TransportError::Auth("invalid_auth".to_string()));
        assert_eq!(slack.read_events().await, Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn test_read_before_connect_is_closed() {
        let server = mockito::Server::new_async().await;
        let mut slack = adapter(&server);
        assert_eq!(slack.read_events().await, Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn test_post_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat.postMessage")
            .match_header("authorization", "Bearer xoxb-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "channel": "C1",
                "text": "hi!",
                "as_user": true
            })))
            .with_status(200)
            .with_body(r#"{"ok": true, "channel": "C1", "ts": "1.0"}"#)
            .expect(1)
            .create_async()
            .await;

        adapter(&server).post_message("C1", "hi!").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat.postMessage")
            .with_status(200)
            .with_body(r#"{"ok": false, "error": "channel_not_found"}"#)
            .create_async()
            .await;

        let err = adapter(&server).post_message("C404", "hi").await.unwrap_err();
        assert_eq!(err, TransportError::Post("channel_not_found".to_string()));
    }

    #[test]
    fn test_identity_check() {
        assert!(identity_matches(None, "U1"));
        assert!(identity_matches(Some("U1"), "U1"));
        assert!(!identity_matches(Some("U2"), "U1"));
    }

    #[tokio::test]
    async fn test_read_events_over_websocket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_url = format!("ws://{}/", listener.local_addr().unwrap());
        let (close_tx, close_rx) = oneshot::channel::<()>();

        let rtm = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::text(r#"{"type":"hello"}"#)).await.unwrap();
            ws.send(Message::text(r#"{"type":"message","channel":"C1","text":"<@U0ANDY>: help"}"#))
                .await
                .unwrap();
            let _ = close_rx.await;
            let _ = ws.close(None).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        let mut server = mockito::Server::new_async().await;
        let _connect = server
            .mock("POST", "/api/rtm.connect")
            .with_status(200)
            .with_body(format!(
                r#"{{"ok": true, "url": "{}", "self": {{"id": "U0ANDY", "name": "andy_bot"}}}}"#,
                ws_url
            ))
            .create_async()
            .await;

        let mut slack = SlackAdapter::new(
            Client::new(),
            format!("{}/api", server.url()),
            "xoxb-test",
            Duration::from_millis(250),
        )
        .with_bot_id("U0ANDY");
        slack.connect().await.unwrap();

        // let both frames land before the first read so one call drains them
        tokio::time::sleep(Duration::from_millis(100)).await;
        let events = slack.read_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], InboundEvent::message("C1", "<@U0ANDY>: help"));

        // nothing pending: the read times out with an empty batch
        assert_eq!(slack.read_events().await, Ok(Vec::new()));

        close_tx.send(()).unwrap();
        assert_eq!(slack.read_events().await, Err(TransportError::Closed));
        assert_eq!(slack.read_events().await, Err(TransportError::Closed));

        let _ = rtm.await;
    }
}
