use crate::types::{KiroError, Result};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket factory for creating WebSocket connections
pub struct WebSocketFactory;

impl WebSocketFactory {
    /// Open a WebSocket connection to `url` (`ws://` or `wss://`)
    pub async fn create(url: &str) -> Result<WsStream> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(KiroError::validation(format!(
                "WebSocket URL must use ws:// or wss://, got '{}'",
                url
            )));
        }

        tracing::debug!("Creating WebSocket connection to: {}", url);
        let (stream, response) = tokio_tungstenite::connect_async(url).await?;
        tracing::debug!("WebSocket handshake completed: {}", response.status());

        Ok(stream)
    }
}
