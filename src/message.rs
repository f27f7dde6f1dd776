//! Wire protocol definitions
//!
//! JSON-based bidirectional frame protocol using Serde's tagged enum
//! for type-safe serialization/deserialization, plus the identifier
//! validation rule shared by every frame that names a user or room.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Client → Server frame
///
/// All frames from client to server. Uses a tagged enum with snake_case
/// naming; a frame whose `type` is not recognized deserializes to
/// `Unknown` and is dropped without an error.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Join a room under a username (at most once per connection)
    Join { username: String, room: String },
    /// Send a chat message to the current room
    ///
    /// `username` and `room` are required and validated for shape, but the
    /// broadcast always uses the server-recorded identity, never these.
    Message {
        username: String,
        room: String,
        content: String,
        timestamp: String,
    },
    /// Any unrecognized frame type
    #[serde(other)]
    Unknown,
}

/// Server → Client frame
///
/// All frames from server to client. Uses a tagged enum with snake_case
/// naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Chat message relayed to every member of the sender's room
    Message {
        username: String,
        content: String,
        timestamp: String,
    },
    /// Snapshot of the currently non-empty room names, sent to everyone
    Rooms { rooms: Vec<String> },
    /// Error notice, sent only to the originating connection
    Error { message: String },
}

/// Validate a username or room name from an inbound frame
///
/// Trims surrounding whitespace, then requires one or more characters
/// drawn from ASCII letters, digits, spaces, underscore and hyphen.
/// Returns the trimmed identifier on success.
pub fn validate_identifier(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'));
    allowed.then_some(trimmed)
}

/// Convert RelayError to the error frame sent back to the client
impl From<RelayError> for ServerFrame {
    fn from(err: RelayError) -> Self {
        let message = match &err {
            RelayError::MalformedFrame => "Malformed message received.".to_string(),
            RelayError::InvalidIdentifier => {
                "Only letters, numbers, spaces, _ and - allowed.".to_string()
            }
            RelayError::UsernameTaken => "Username already taken in this room.".to_string(),
            RelayError::NotJoined => "You must join a room first.".to_string(),
            // Fatal errors are not typically converted (connection closes)
            _ => "Internal error".to_string(),
        };
        ServerFrame::Error { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_frame_deserialize() {
        let json = r#"{"type": "join", "username": "alice", "room": "general"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        match frame {
            ClientFrame::Join { username, room } => {
                assert_eq!(username, "alice");
                assert_eq!(room, "general");
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_message_frame_deserialize() {
        let json = r#"{"type": "message", "username": "alice", "room": "general",
                       "content": "hi", "timestamp": "10:15:00 AM"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        match frame {
            ClientFrame::Message {
                username,
                room,
                content,
                timestamp,
            } => {
                assert_eq!(username, "alice");
                assert_eq!(room, "general");
                assert_eq!(content, "hi");
                assert_eq!(timestamp, "10:15:00 AM");
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_unrecognized_type_is_unknown() {
        let json = r#"{"type": "presence", "status": "away"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert!(matches!(frame, ClientFrame::Unknown));
    }

    #[test]
    fn test_malformed_frames_rejected() {
        // Not JSON at all
        assert!(serde_json::from_str::<ClientFrame>("hello").is_err());
        // No type tag
        assert!(serde_json::from_str::<ClientFrame>(r#"{"username": "alice"}"#).is_err());
        // Missing required field
        assert!(
            serde_json::from_str::<ClientFrame>(r#"{"type": "join", "username": "alice"}"#)
                .is_err()
        );
        // Field of the wrong JSON type
        assert!(serde_json::from_str::<ClientFrame>(
            r#"{"type": "join", "username": 42, "room": "general"}"#
        )
        .is_err());
    }

    #[test]
    fn test_message_frame_serialize() {
        let frame = ServerFrame::Message {
            username: "alice".to_string(),
            content: "hi".to_string(),
            timestamp: "10:15:00 AM".to_string(),
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"message\""));
        assert!(json.contains("\"username\":\"alice\""));
        assert!(json.contains("\"content\":\"hi\""));
        assert!(json.contains("\"timestamp\":\"10:15:00 AM\""));
    }

    #[test]
    fn test_rooms_frame_serialize() {
        let frame = ServerFrame::Rooms {
            rooms: vec!["general".to_string(), "team 1".to_string()],
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"type":"rooms","rooms":["general","team 1"]}"#);
    }

    #[test]
    fn test_error_frame_serialize() {
        let frame = ServerFrame::Error {
            message: "Test".to_string(),
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"type":"error","message":"Test"}"#);
    }

    #[test]
    fn test_error_conversion_texts() {
        let cases = [
            (RelayError::MalformedFrame, "Malformed message received."),
            (
                RelayError::InvalidIdentifier,
                "Only letters, numbers, spaces, _ and - allowed.",
            ),
            (
                RelayError::UsernameTaken,
                "Username already taken in this room.",
            ),
            (RelayError::NotJoined, "You must join a room first."),
        ];
        for (err, expected) in cases {
            match ServerFrame::from(err) {
                ServerFrame::Error { message } => assert_eq!(message, expected),
                _ => panic!("Wrong variant"),
            }
        }
    }

    #[test]
    fn test_validate_identifier_accepts_allowed_charset() {
        assert_eq!(validate_identifier("alice"), Some("alice"));
        assert_eq!(validate_identifier("team_1"), Some("team_1"));
        assert_eq!(validate_identifier("team 1"), Some("team 1"));
        assert_eq!(validate_identifier("a-b-c"), Some("a-b-c"));
        assert_eq!(validate_identifier("Room42"), Some("Room42"));
    }

    #[test]
    fn test_validate_identifier_trims_whitespace() {
        assert_eq!(validate_identifier("  alice  "), Some("alice"));
        assert_eq!(validate_identifier("\tgeneral\n"), Some("general"));
    }

    #[test]
    fn test_validate_identifier_rejects_bad_input() {
        assert_eq!(validate_identifier("team#1"), None);
        assert_eq!(validate_identifier(""), None);
        assert_eq!(validate_identifier("   "), None);
        assert_eq!(validate_identifier("alice!"), None);
        assert_eq!(validate_identifier("<script>"), None);
        // Non-ASCII letters are outside the allowed set
        assert_eq!(validate_identifier("café"), None);
        // Interior control characters are not surrounding whitespace
        assert_eq!(validate_identifier("a\tb"), None);
    }
}
