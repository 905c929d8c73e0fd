use std::time::Duration;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::models::SendMessage;
use super::error::DiscoveryError;

type ServerStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Ask a running sync server which address it sees us connecting from.
///
/// The server broadcasts `ip` to every client, so under concurrent requests
/// the first `ip` seen may belong to another peer on the same network.
pub async fn request_ip(server_url: &str, wait: Duration) -> Result<String, DiscoveryError> {
    let (mut ws, _) = connect_async(server_url).await?;
    info!("Connected to {}, requesting observed address", server_url);

    ws.send(Message::text(r#"{"event":"getIP","data":1}"#)).await?;

    let ip = tokio::time::timeout(wait, wait_for_ip(&mut ws))
        .await
        .map_err(|_| DiscoveryError::Timeout)??;

    let _ = ws.close(None).await;
    Ok(ip)
}

async fn wait_for_ip(ws: &mut ServerStream) -> Result<String, DiscoveryError> {
    while let Some(frame) = ws.next().await {
        let Message::Text(text) = frame? else { continue };
        match serde_json::from_str::<SendMessage>(text.as_str()) {
            Ok(SendMessage::Ip(ip)) => return Ok(ip),
            Ok(other) => debug!("Ignoring {:?} while waiting for ip", other),
            Err(e) => debug!("Ignoring unreadable frame: {}", e),
        }
    }
    Err(DiscoveryError::Closed)
}
