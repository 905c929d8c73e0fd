use thiserror::Error;

use super::registry::ConnectionId;

/// Errors raised while handling a single protocol event.
///
/// None of these are fatal: the offending event is logged and dropped and the
/// connection stays usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("unknown connection '{0}'")]
    UnknownConnection(ConnectionId),

    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("malformed '{event}' payload: {reason}")]
    MalformedEventPayload { event: String, reason: String },
}

impl SyncError {
    pub fn malformed(event: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::MalformedEventPayload {
            event: event.into(),
            reason: reason.into(),
        }
    }
}
