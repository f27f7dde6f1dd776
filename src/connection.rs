//! Connection struct definition
//!
//! Represents one live client connection: its identity fields and the
//! outbound channel draining to its WebSocket write task.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerFrame;
use crate::types::ConnectionId;

/// Live connection state
///
/// Holds the connection's unique ID, its identity once joined (username
/// and room, both set together and only after validation), and the
/// sender half of its outbound frame channel.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Username (None until the first successful join)
    pub username: Option<String>,
    /// Room the connection has joined (None until then)
    pub room: Option<String>,
    /// Server → client frame channel
    pub sender: mpsc::Sender<ServerFrame>,
}

impl Connection {
    /// Create a new connection with the given ID and sender channel
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerFrame>) -> Self {
        Self {
            id,
            username: None,
            room: None,
            sender,
        }
    }

    /// Queue a frame for this connection without blocking
    ///
    /// Broadcast fan-out runs on the state actor, so this never waits: a
    /// full outbound buffer or a closed channel (client mid-disconnect)
    /// reports a `SendError` the caller is free to ignore.
    pub fn send(&self, frame: ServerFrame) -> Result<(), SendError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Check whether this connection has joined a room
    pub fn is_joined(&self) -> bool {
        self.username.is_some() && self.room.is_some()
    }

    /// Record identity after a validated join
    pub fn set_identity(&mut self, username: String, room: String) {
        self.username = Some(username);
        self.room = Some(room);
    }

    /// Clear identity when the connection leaves its room
    pub fn clear_identity(&mut self) {
        self.username = None;
        self.room = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let conn = Connection::new(ConnectionId::new(), tx);

        assert!(conn.username.is_none());
        assert!(conn.room.is_none());
        assert!(!conn.is_joined());
    }

    #[tokio::test]
    async fn test_connection_identity() {
        let (tx, _rx) = mpsc::channel(32);
        let mut conn = Connection::new(ConnectionId::new(), tx);

        conn.set_identity("alice".to_string(), "general".to_string());

        assert!(conn.is_joined());
        assert_eq!(conn.username.as_deref(), Some("alice"));
        assert_eq!(conn.room.as_deref(), Some("general"));

        conn.clear_identity();

        assert!(!conn.is_joined());
        assert!(conn.username.is_none());
        assert!(conn.room.is_none());
    }

    #[tokio::test]
    async fn test_send_delivers_frame() {
        let (tx, mut rx) = mpsc::channel(32);
        let conn = Connection::new(ConnectionId::new(), tx);

        conn.send(ServerFrame::Rooms {
            rooms: vec!["general".to_string()],
        })
        .unwrap();

        match rx.try_recv() {
            Ok(ServerFrame::Rooms { rooms }) => assert_eq!(rooms, vec!["general"]),
            other => panic!("Unexpected frame: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_full_buffer_does_not_block() {
        let (tx, _rx) = mpsc::channel(1);
        let conn = Connection::new(ConnectionId::new(), tx);

        let frame = ServerFrame::Error {
            message: "x".to_string(),
        };
        conn.send(frame.clone()).unwrap();

        assert!(matches!(conn.send(frame), Err(SendError::Full)));
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(32);
        let conn = Connection::new(ConnectionId::new(), tx);
        drop(rx);

        let frame = ServerFrame::Error {
            message: "x".to_string(),
        };
        assert!(matches!(conn.send(frame), Err(SendError::Closed)));
    }
}
