use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::EditPayload;
use crate::sync::ConnectionId;
use crate::AppState;

/// Handle updateInput - apply, then relay to all other connections.
pub async fn handle_update_input_message(payload: EditPayload, connection_id: ConnectionId, state: &Arc<AppState>) {
    debug!("updateInput received from {}: {:?}", connection_id, payload);

    if let Err(e) = state.hub.lock().await.handle_update_input(&connection_id, payload) {
        warn!("Dropping updateInput from {}: {}", connection_id, e);
    }
}
