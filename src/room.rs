//! Room directory
//!
//! Owns the room name → member set mapping and its invariants: usernames
//! are unique within a room (case-sensitive), a connection belongs to at
//! most one room, and a room entry exists exactly while it has members.
//! Rooms have no state of their own beyond the set of connections
//! currently claiming them.

use std::collections::{HashMap, HashSet};

use crate::error::RelayError;
use crate::registry::ConnectionRegistry;
use crate::types::ConnectionId;

/// Room name → member connection IDs
///
/// Membership is non-owning: the registry owns connection lifetime, the
/// directory only tracks which room each live connection claims.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl RoomDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a connection to a room under a username
    ///
    /// The room entry is created lazily on first join. If any current
    /// member's recorded username matches exactly, fails with
    /// `UsernameTaken` and changes nothing. On success the member set is
    /// updated and the identity recorded on the connection via the
    /// registry, as one step.
    pub fn join(
        &mut self,
        registry: &mut ConnectionRegistry,
        id: ConnectionId,
        username: &str,
        room: &str,
    ) -> Result<(), RelayError> {
        let members = self.rooms.entry(room.to_string()).or_default();
        let taken = members.iter().any(|member| {
            registry
                .get(*member)
                .and_then(|conn| conn.username.as_deref())
                == Some(username)
        });
        if taken {
            return Err(RelayError::UsernameTaken);
        }

        members.insert(id);
        registry.set_identity(id, username, room);
        Ok(())
    }

    /// Remove a connection from its current room, if any
    ///
    /// Deletes the room entry when its member set empties, so the name
    /// drops out of listings immediately, and clears the connection's
    /// identity. Returns whether membership actually changed; idempotent,
    /// and a no-op for connections that never joined.
    pub fn leave(&mut self, registry: &mut ConnectionRegistry, id: ConnectionId) -> bool {
        let Some(room) = registry.get(id).and_then(|conn| conn.room.clone()) else {
            return false;
        };
        registry.clear_identity(id);

        let Some(members) = self.rooms.get_mut(&room) else {
            return false;
        };
        let changed = members.remove(&id);
        if members.is_empty() {
            self.rooms.remove(&room);
        }
        changed
    }

    /// Names of the currently non-empty rooms
    ///
    /// Order carries no meaning and must not be relied upon.
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    /// Iterate over the member IDs of a room
    pub fn members(&self, room: &str) -> impl Iterator<Item = ConnectionId> + '_ {
        self.rooms.get(room).into_iter().flatten().copied()
    }

    /// Number of members currently in a room
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, HashSet::len)
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
