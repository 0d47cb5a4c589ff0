//! WebSocket connector for the backend's status channel.
//!
//! [`StatusSocket`] holds the endpoint URL. Call
//! [`StatusSocket::connect`] to open one live [`WsStream`]; the
//! reconnect policy lives in [`JobChannel`](crate::channel::JobChannel).

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// A live status-channel connection.
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection settings for the status channel.
#[derive(Debug, Clone)]
pub struct StatusSocket {
    ws_url: String,
}

impl StatusSocket {
    /// * `ws_url` - full endpoint, e.g. `ws://127.0.0.1:8000/ws/status`.
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Open the WebSocket. The client never sends application frames.
    pub async fn connect(&self) -> Result<WsStream, ChannelError> {
        let (ws_stream, _response) = connect_async(self.ws_url.as_str()).await.map_err(|e| {
            ChannelError::Connection(format!("Failed to connect to {}: {e}", self.ws_url))
        })?;

        tracing::info!(url = %self.ws_url, "Status channel connected");
        Ok(ws_stream)
    }
}

/// Errors from the status channel transport.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Connection error: {0}")]
    Connection(String),
}
