//! Connection registry
//!
//! Tracks every live connection and its current identity fields,
//! independent of room membership. The registry owns each `Connection`
//! for its whole lifetime: created on transport connect, dropped on
//! transport close. It does no messaging of its own.

use std::collections::HashMap;

use crate::connection::Connection;
use crate::types::ConnectionId;

/// All live connections, keyed by ID
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a newly opened connection (no username, no room)
    pub fn register(&mut self, conn: Connection) {
        self.connections.insert(conn.id, conn);
    }

    /// Remove a connection unconditionally
    ///
    /// Idempotent: removing an already-removed connection is a no-op.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    /// Look up a connection by ID
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Record identity on a connection
    ///
    /// Called only after the room directory has validated the join.
    pub fn set_identity(&mut self, id: ConnectionId, username: &str, room: &str) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.set_identity(username.to_string(), room.to_string());
        }
    }

    /// Clear identity on a connection that left its room
    pub fn clear_identity(&mut self, id: ConnectionId) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.clear_identity();
        }
    }

    /// Iterate over every live connection
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections are live
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // No test here sends frames, so dropping the receiver is fine.
    fn test_connection() -> Connection {
        let (tx, _rx) = mpsc::channel(32);
        Connection::new(ConnectionId::new(), tx)
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ConnectionRegistry::new();
        let conn = test_connection();
        let id = conn.id;

        registry.register(conn);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        let conn = test_connection();
        let id = conn.id;
        registry.register(conn);

        assert!(registry.unregister(id).is_some());
        assert!(registry.unregister(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_identity_recording() {
        let mut registry = ConnectionRegistry::new();
        let conn = test_connection();
        let id = conn.id;
        registry.register(conn);

        registry.set_identity(id, "alice", "general");
        let conn = registry.get(id).unwrap();
        assert_eq!(conn.username.as_deref(), Some("alice"));
        assert_eq!(conn.room.as_deref(), Some("general"));

        registry.clear_identity(id);
        let conn = registry.get(id).unwrap();
        assert!(!conn.is_joined());
    }

    #[test]
    fn test_identity_on_missing_connection_is_noop() {
        let mut registry = ConnectionRegistry::new();
        // Neither call should panic on an unknown ID
        registry.set_identity(ConnectionId::new(), "alice", "general");
        registry.clear_identity(ConnectionId::new());
        assert!(registry.is_empty());
    }
}
