//! Multi-room WebSocket Chat Relay Library
//!
//! A WebSocket chat relay built with tokio-tungstenite using the Actor
//! pattern for state management. Clients join named rooms, exchange
//! broadcast text messages, and receive room-list updates as rooms
//! appear and empty out.
//!
//! # Features
//! - WebSocket connection handling
//! - Client-named rooms, created on first join and dropped when empty
//! - Per-room username uniqueness (the same name may live in two rooms)
//! - Room-wide message broadcast, best-effort per recipient
//! - Room-list updates pushed to every connection
//! - Disconnection cleanup
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatRelay` is the central actor owning all state
//! - Each connection has a `handler` task communicating with the relay
//! - Raw inbound frames are parsed and validated inside the actor, so
//!   no two operations interleave their effects on the room directory
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{ChatRelay, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ChatRelay::new(cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use connection::Connection;
pub use error::{RelayError, SendError};
pub use handler::handle_connection;
pub use message::{validate_identifier, ClientFrame, ServerFrame};
pub use registry::ConnectionRegistry;
pub use room::RoomDirectory;
pub use server::{ChatRelay, RelayCommand};
pub use types::ConnectionId;
