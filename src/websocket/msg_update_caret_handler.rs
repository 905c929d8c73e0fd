use std::sync::Arc;
use tracing::warn;

use crate::models::CaretMessage;
use crate::sync::ConnectionId;
use crate::AppState;

/// Handle updateCaret - record only, never broadcast.
pub async fn handle_update_caret_message(caret: &CaretMessage, connection_id: ConnectionId, state: &Arc<AppState>) {
    if let Err(e) = state.hub.lock().await.handle_update_caret(&connection_id, caret.caret_position) {
        warn!("Dropping updateCaret from {}: {}", connection_id, e);
    }
}
