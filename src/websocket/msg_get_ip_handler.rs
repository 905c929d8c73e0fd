use std::sync::Arc;
use tracing::{info, warn};

use crate::sync::ConnectionId;
use crate::AppState;

/// Handle getIP - the requester's address goes out to every connection.
pub async fn handle_get_ip_message(connection_id: ConnectionId, state: &Arc<AppState>) {
    info!("getIP received from {}", connection_id);

    if let Err(e) = state.hub.lock().await.handle_get_ip(&connection_id) {
        warn!("Dropping getIP from {}: {}", connection_id, e);
    }
}
