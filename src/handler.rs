//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake, frame
//! forwarding, and bidirectional communication with the ChatRelay.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

use crate::error::RelayError;
use crate::message::ServerFrame;
use crate::server::RelayCommand;
use crate::types::ConnectionId;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers with the relay, and runs
/// read and write tasks until either side goes away. Inbound frame text
/// is forwarded to the relay untouched; parsing and every reply happen
/// there, so outbound frames for this connection keep dispatch order.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<RelayCommand>,
) -> Result<(), RelayError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Generate connection ID
    let id = ConnectionId::new();
    info!("Connection {} accepted from {}", id, peer_addr);

    // Create channel for server -> client frames
    let (frame_tx, mut frame_rx) = mpsc::channel::<ServerFrame>(32);

    // Register with the relay
    if cmd_tx
        .send(RelayCommand::Connect {
            id,
            sender: frame_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - relay closed", id);
        return Err(RelayError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> RelayCommand)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let cmd = RelayCommand::Inbound { id, text };
                    if cmd_tx_read.send(cmd).await.is_err() {
                        debug!("Relay closed, ending read task for {}", id);
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", id);
                    break;
                }
                Ok(Message::Ping(data)) => {
                    debug!("Ping from {}", id);
                    // Pong is handled automatically by tungstenite
                    let _ = data; // Suppress unused warning
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", id);
    });

    // Spawn write task (ServerFrame -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize frame: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for connection");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", id);
        }
    }

    // Send disconnect command
    let _ = cmd_tx.send(RelayCommand::Disconnect { id }).await;

    info!("Connection {} closed", id);

    Ok(())
}
