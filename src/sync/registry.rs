use std::collections::HashMap;
use std::net::SocketAddr;
use tracing::debug;
use uuid::Uuid;

use super::error::SyncError;

pub type ConnectionId = Uuid;

/// One live client session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub origin_address: SocketAddr,
    pub caret_position: usize,
}

/// Index of live connections and their last reported caret.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId, origin_address: SocketAddr) -> Result<(), SyncError> {
        if self.connections.contains_key(&id) {
            return Err(SyncError::DuplicateConnection(id));
        }
        self.connections.insert(id, Connection {
            id,
            origin_address,
            caret_position: 0,
        });
        Ok(())
    }

    /// Removing an absent id is treated as already cleaned up.
    pub fn unregister(&mut self, id: &ConnectionId) {
        if self.connections.remove(id).is_none() {
            debug!("Connection {} was already unregistered", id);
        }
    }

    pub fn update_caret(&mut self, id: &ConnectionId, position: usize) -> Result<(), SyncError> {
        let conn = self
            .connections
            .get_mut(id)
            .ok_or(SyncError::UnknownConnection(*id))?;
        conn.caret_position = position;
        Ok(())
    }

    pub fn lookup(&self, id: &ConnectionId) -> Result<&Connection, SyncError> {
        self.connections.get(id).ok_or(SyncError::UnknownConnection(*id))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "192.168.1.20:51000".parse().unwrap()
    }

    #[test]
    fn register_starts_caret_at_zero() {
        let mut registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id, addr()).unwrap();

        let conn = registry.lookup(&id).unwrap();
        assert_eq!(conn.caret_position, 0);
        assert_eq!(conn.origin_address, addr());
    }

    #[test]
    fn duplicate_register_is_rejected() {
        let mut registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id, addr()).unwrap();

        assert_eq!(registry.register(id, addr()), Err(SyncError::DuplicateConnection(id)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn caret_updates_only_touch_the_named_connection() {
        let mut registry = ConnectionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.register(a, addr()).unwrap();
        registry.register(b, addr()).unwrap();

        registry.update_caret(&a, 7).unwrap();

        assert_eq!(registry.lookup(&a).unwrap().caret_position, 7);
        assert_eq!(registry.lookup(&b).unwrap().caret_position, 0);
    }

    #[test]
    fn unknown_ids_fail() {
        let mut registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();

        assert_eq!(registry.update_caret(&id, 1), Err(SyncError::UnknownConnection(id)));
        assert_eq!(registry.lookup(&id), Err(SyncError::UnknownConnection(id)));
    }

    #[test]
    fn unregister_removes_entry_and_tolerates_repeats() {
        let mut registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id, addr()).unwrap();

        registry.unregister(&id);
        registry.unregister(&id);

        assert!(registry.is_empty());
        assert_eq!(registry.lookup(&id), Err(SyncError::UnknownConnection(id)));
    }
}
