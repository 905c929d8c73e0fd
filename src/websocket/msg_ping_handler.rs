use tracing::{debug, error};
use chrono::Utc;

use crate::models::{PongMessage, SendMessage};
use crate::sync::ConnectionId;
use super::handler::{send_message, WsSender};

/// Handle ping - reply to the requester only, no shared state is touched.
pub async fn handle_ping_message(connection_id: ConnectionId, sender: &WsSender) {
    debug!("Ping message received from {}", connection_id);

    let pong = SendMessage::Pong(PongMessage { date: Utc::now().to_rfc3339() });
    if let Err(e) = send_message(sender, &pong).await {
        error!("Failed to send pong to {}: {}", connection_id, e);
    }
}
