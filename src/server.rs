//! ChatRelay actor implementation
//!
//! The central actor that owns all state: the connection registry and the
//! room directory. Uses the Actor pattern with mpsc channels for message
//! passing; every inbound frame is parsed, validated and dispatched here,
//! one command at a time, so join/message/leave effects never interleave
//! and the per-room username uniqueness check is race-free by construction.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::RelayError;
use crate::message::{validate_identifier, ClientFrame, ServerFrame};
use crate::registry::ConnectionRegistry;
use crate::room::RoomDirectory;
use crate::types::ConnectionId;

/// Commands sent from connection handlers to the ChatRelay actor
#[derive(Debug)]
pub enum RelayCommand {
    /// New connection opened
    Connect {
        id: ConnectionId,
        sender: mpsc::Sender<ServerFrame>,
    },
    /// One raw text frame arrived from the client
    Inbound { id: ConnectionId, text: String },
    /// Connection closed, gracefully or through a transport error
    Disconnect { id: ConnectionId },
}

/// The main chat relay actor
///
/// Registry and directory are owned outright; no locks are needed because
/// all access goes through the serialized command loop.
pub struct ChatRelay {
    /// Every live connection and its identity fields
    registry: ConnectionRegistry,
    /// Room name → member set
    directory: RoomDirectory,
    /// Command receiver channel
    receiver: mpsc::Receiver<RelayCommand>,
}

impl ChatRelay {
    /// Create a new relay with the given command receiver
    pub fn new(receiver: mpsc::Receiver<RelayCommand>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            directory: RoomDirectory::new(),
            receiver,
        }
    }

    /// Run the relay event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped. Each command runs to completion, broadcasts included,
    /// before the next is taken.
    pub async fn run(mut self) {
        info!("ChatRelay started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatRelay shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect { id, sender } => {
                self.handle_connect(id, sender);
            }
            RelayCommand::Inbound { id, text } => {
                self.handle_inbound(id, &text);
            }
            RelayCommand::Disconnect { id } => {
                self.handle_disconnect(id);
            }
        }
    }

    /// Handle a newly opened connection
    ///
    /// Registers it with no identity; nothing is sent to the client. It
    /// will see the room list with the next membership change.
    fn handle_connect(&mut self, id: ConnectionId, sender: mpsc::Sender<ServerFrame>) {
        info!("Connection {} opened", id);
        self.registry.register(Connection::new(id, sender));
        debug!(
            "Total connections: {}, total rooms: {}",
            self.registry.len(),
            self.directory.room_count()
        );
    }

    /// Handle a closed connection
    ///
    /// Leaves the room (if any), unregisters, and broadcasts the room
    /// list only when membership actually changed.
    fn handle_disconnect(&mut self, id: ConnectionId) {
        info!("Connection {} closed", id);

        let changed = self.directory.leave(&mut self.registry, id);
        self.registry.unregister(id);
        if changed {
            self.broadcast_room_list();
        }

        debug!(
            "Total connections: {}, total rooms: {}",
            self.registry.len(),
            self.directory.room_count()
        );
    }

    /// Parse one inbound frame and dispatch on its type
    ///
    /// Unparseable input and wrong-shaped fields get a generic error
    /// frame; frames with an unrecognized type are dropped silently.
    fn handle_inbound(&mut self, id: ConnectionId, text: &str) {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Malformed frame from {}: {}", id, e);
                self.send_error(id, RelayError::MalformedFrame);
                return;
            }
        };

        match frame {
            ClientFrame::Join { username, room } => {
                self.handle_join(id, &username, &room);
            }
            ClientFrame::Message {
                username,
                room,
                content,
                timestamp,
            } => {
                self.handle_message(id, &username, &room, content, timestamp);
            }
            ClientFrame::Unknown => {
                debug!("Ignoring frame with unrecognized type from {}", id);
            }
        }
    }

    /// Handle a join request
    fn handle_join(&mut self, id: ConnectionId, username: &str, room: &str) {
        let Some(conn) = self.registry.get(id) else {
            return;
        };

        // Joined is terminal until disconnect; repeat joins are not modeled
        if conn.is_joined() {
            debug!("Connection {} sent join while already in a room", id);
            return;
        }

        let Some(username) = validate_identifier(username) else {
            self.send_error(id, RelayError::InvalidIdentifier);
            return;
        };
        let Some(room) = validate_identifier(room) else {
            self.send_error(id, RelayError::InvalidIdentifier);
            return;
        };

        match self.directory.join(&mut self.registry, id, username, room) {
            Ok(()) => {
                info!("Connection {} joined room '{}' as '{}'", id, room, username);
                self.broadcast_room_list();
            }
            Err(err) => self.send_error(id, err),
        }
    }

    /// Handle a chat message
    ///
    /// The frame's own username/room are validated like on every inbound
    /// frame, then discarded: the relayed frame carries the recorded
    /// identity, and delivery goes to the recorded room.
    fn handle_message(
        &mut self,
        id: ConnectionId,
        username: &str,
        room: &str,
        content: String,
        timestamp: String,
    ) {
        if validate_identifier(username).is_none() || validate_identifier(room).is_none() {
            self.send_error(id, RelayError::InvalidIdentifier);
            return;
        }

        let Some(conn) = self.registry.get(id) else {
            return;
        };
        let (Some(username), Some(room)) = (conn.username.clone(), conn.room.clone()) else {
            self.send_error(id, RelayError::NotJoined);
            return;
        };

        debug!("[{}] {}: {}", room, username, content);
        self.broadcast_to_room(
            &room,
            ServerFrame::Message {
                username,
                content,
                timestamp,
            },
        );
    }

    /// Best-effort fan-out of one frame to every member of a room
    ///
    /// A failed send (closing connection, full buffer) is skipped; it
    /// never aborts delivery to the remaining members.
    fn broadcast_to_room(&self, room: &str, frame: ServerFrame) {
        for member in self.directory.members(room) {
            let Some(conn) = self.registry.get(member) else {
                continue;
            };
            if let Err(e) = conn.send(frame.clone()) {
                debug!("Skipping send to {}: {}", member, e);
            }
        }
    }

    /// Send the current room-list snapshot to every connection
    ///
    /// Everyone gets it, joined or not, so clients still picking a room
    /// see an up-to-date list.
    fn broadcast_room_list(&self) {
        let frame = ServerFrame::Rooms {
            rooms: self.directory.room_names(),
        };
        for conn in self.registry.iter() {
            if let Err(e) = conn.send(frame.clone()) {
                debug!("Skipping room list for {}: {}", conn.id, e);
            }
        }
    }

    /// Send an error frame to a single connection
    fn send_error(&self, id: ConnectionId, err: RelayError) {
        let Some(conn) = self.registry.get(id) else {
            return;
        };
        if let Err(e) = conn.send(err.into()) {
            debug!("Could not deliver error to {}: {}", id, e);
        }
    }
}
