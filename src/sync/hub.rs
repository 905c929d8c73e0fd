use std::net::SocketAddr;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::models::{EditPayload, SendMessage};
use super::document::SharedDocument;
use super::error::SyncError;
use super::registry::{Connection, ConnectionId, ConnectionRegistry};

/// Which shape of `updateInput` the deployment accepts.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditProtocol {
    Delta,
    FullText,
    #[default]
    Mixed,
}

impl EditProtocol {
    fn accepts(self, payload: &EditPayload) -> bool {
        matches!(
            (self, payload),
            (EditProtocol::Mixed, _)
                | (EditProtocol::Delta, EditPayload::Keystroke(_))
                | (EditProtocol::FullText, EditPayload::FullText(_))
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recipients {
    All,
    AllExcept(ConnectionId),
}

/// An event queued for fan-out, with the set of connections it is meant for.
#[derive(Clone, Debug)]
pub struct Outbound {
    pub recipients: Recipients,
    pub message: SendMessage,
}

impl Outbound {
    pub fn is_for(&self, id: &ConnectionId) -> bool {
        match &self.recipients {
            Recipients::All => true,
            Recipients::AllExcept(sender) => sender != id,
        }
    }
}

/// What a freshly registered connection needs to start consistent.
pub struct Joined {
    pub snapshot: String,
    pub events: broadcast::Receiver<Outbound>,
}

/// Owns the shared document and the connection registry and applies every
/// protocol event to them.
pub struct SyncHub {
    registry: ConnectionRegistry,
    document: SharedDocument,
    bc: broadcast::Sender<Outbound>,
    protocol: EditProtocol,
}

impl SyncHub {
    pub fn new(protocol: EditProtocol, capacity: usize) -> Self {
        let (bc, _rx) = broadcast::channel::<Outbound>(capacity.max(1));
        Self {
            registry: ConnectionRegistry::new(),
            document: SharedDocument::new(),
            bc,
            protocol,
        }
    }

    /// Register a connection and hand back the bootstrap snapshot together
    /// with its event subscription. Both are taken under the same borrow, so
    /// no edit can slip between the snapshot and the first broadcast seen.
    pub fn connect(&mut self, id: ConnectionId, origin_address: SocketAddr) -> Result<Joined, SyncError> {
        self.registry.register(id, origin_address)?;
        info!("Connection {} registered from {} ({} live)", id, origin_address, self.registry.len());
        Ok(Joined {
            snapshot: self.document.snapshot(),
            events: self.bc.subscribe(),
        })
    }

    pub fn disconnect(&mut self, id: &ConnectionId) {
        self.registry.unregister(id);
        info!("Connection {} unregistered ({} live)", id, self.registry.len());
    }

    /// Broadcast the requester's address to every connection, requester included.
    pub fn handle_get_ip(&self, id: &ConnectionId) -> Result<(), SyncError> {
        let origin = self.registry.lookup(id)?.origin_address;
        let ip = origin.ip().to_canonical().to_string();
        info!("Sending ip address {} to all clients", ip);
        self.broadcast_all(SendMessage::Ip(ip));
        Ok(())
    }

    /// Apply an edit to the document and relay it to everyone but the sender.
    pub fn handle_update_input(&mut self, id: &ConnectionId, payload: EditPayload) -> Result<(), SyncError> {
        self.registry.lookup(id)?;
        if !self.protocol.accepts(&payload) {
            return Err(SyncError::malformed(
                "updateInput",
                format!("payload variant not accepted under {:?} edit protocol", self.protocol),
            ));
        }

        match &payload {
            EditPayload::Keystroke(edit) => {
                self.document.apply_character_edit(edit.caret_position, edit.key_pressed)?;
                self.registry.update_caret(id, edit.caret_position)?;
                debug!("Connection {} typed {} at {}", id, edit.key_pressed, edit.caret_position);
            }
            EditPayload::FullText(text) => {
                self.document.apply_edit(text.clone());
                debug!("Connection {} replaced the document ({} bytes)", id, text.len());
            }
        }

        self.broadcast_except(id, SendMessage::Update(payload));
        Ok(())
    }

    /// Record the sender's caret. Nothing is broadcast.
    pub fn handle_update_caret(&mut self, id: &ConnectionId, caret_position: usize) -> Result<(), SyncError> {
        self.registry.update_caret(id, caret_position)
    }

    pub fn broadcast_all(&self, message: SendMessage) {
        self.publish(Outbound { recipients: Recipients::All, message });
    }

    pub fn broadcast_except(&self, sender: &ConnectionId, message: SendMessage) {
        self.publish(Outbound { recipients: Recipients::AllExcept(*sender), message });
    }

    fn publish(&self, outbound: Outbound) {
        // Fails only when nobody is subscribed.
        if self.bc.send(outbound).is_err() {
            debug!("No live subscribers for broadcast");
        }
    }

    pub fn snapshot(&self) -> String {
        self.document.snapshot()
    }

    pub fn lookup(&self, id: &ConnectionId) -> Result<&Connection, SyncError> {
        self.registry.lookup(id)
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn document_len(&self) -> usize {
        self.document.char_len()
    }
}
