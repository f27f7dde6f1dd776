//! Error types for the chat relay
//!
//! Defines application-level errors and outbound send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and protocol
/// errors (send an error frame back to the client and carry on).
#[derive(Debug, Error)]
pub enum RelayError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Inbound frame was unparseable or had the wrong shape
    #[error("Malformed frame")]
    MalformedFrame,

    /// Username or room name failed the allowed-character rule
    #[error("Invalid username or room name")]
    InvalidIdentifier,

    /// Username already present in the target room
    #[error("Username taken in room")]
    UsernameTaken,

    /// Message sent before joining a room
    #[error("Not joined to any room")]
    NotJoined,
}

/// Outbound send errors
///
/// Occurs when handing a frame to a connection's outbound channel fails.
/// Both conditions are skipped silently during broadcasts: a slow or dead
/// receiver must never stall delivery to the rest of the room.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    Closed,

    /// The connection's outbound buffer is full
    #[error("Outbound buffer full")]
    Full,
}
