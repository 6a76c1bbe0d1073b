//! Per-connection handler: join the room, then relay moves in and
//! snapshots out.
//!
//! Each accepted connection runs two tasks:
//!   - the reader (this function): receive → decode → eligibility check →
//!     submit to the room
//!   - the writer ([`write_loop`]): the only task that sends on the socket.
//!     It drains the participant's outbound channel and closes the socket
//!     once every sender is gone.
//!
//! Whatever ends the reader (close, read error, malformed input, panic),
//! the [`LeaveGuard`] tells the room.

use std::sync::Arc;

use tacgrid_protocol::{codes, Codec, MoveRequest, ServerMessage};
use tacgrid_room::{RoomError, RoomHandle};
use tacgrid_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::TacgridError;

/// Drop guard that gives up the participant's slot when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the send.
struct LeaveGuard {
    conn_id: ConnectionId,
    room: RoomHandle,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let room = self.room.clone();
        tokio::spawn(async move {
            let _ = room.leave(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TacgridError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    // --- Step 1: Join ---
    let (tx, rx) = mpsc::unbounded_channel();
    let participant = match state.room.join(conn_id, tx.clone()).await {
        Ok(participant) => participant,
        Err(err) => {
            tracing::info!(%conn_id, error = %err, "join refused");
            let bytes = state
                .codec
                .encode(&ServerMessage::error(err.code(), err.to_string()))?;
            let _ = conn.send(&bytes).await;
            let _ = conn.close().await;
            return Err(err.into());
        }
    };
    let guard = LeaveGuard {
        conn_id,
        room: state.room.clone(),
    };

    tracing::info!(
        %conn_id,
        slot = %participant.slot,
        symbol = %participant.symbol,
        "participant connected"
    );

    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        rx,
        Arc::clone(&state),
        conn_id,
    ));

    // --- Step 2: Move loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let request: MoveRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!(%conn_id, error = %e, "malformed move, ending session");
                let _ = tx.send(ServerMessage::error(
                    codes::MALFORMED_MOVE,
                    format!("malformed move: {e}"),
                ));
                break;
            }
        };

        if !state.room.can_move(participant.slot) {
            tracing::debug!(%conn_id, symbol = %participant.symbol, "move out of turn");
            let err = RoomError::NotYourTurn;
            let _ = tx.send(ServerMessage::error(err.code(), err.to_string()));
            continue;
        }

        if let Err(e) = state.room.submit_move(conn_id, request.cell()).await {
            tracing::warn!(%conn_id, error = %e, "room unavailable");
            break;
        }
    }

    // The writer finishes once the room has dropped its sender too.
    drop(tx);
    drop(guard);
    let _ = writer.await;
    Ok(())
}

/// Sends everything queued for the participant, in order.
///
/// A failed send counts as a disconnect. The socket is closed when the
/// loop ends.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
    state: Arc<ServerState<C>>,
    conn_id: ConnectionId,
) {
    while let Some(msg) = outbound.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, dropping participant");
            let _ = state.room.leave(conn_id).await;
            break;
        }
    }

    if let Err(e) = conn.close().await {
        tracing::trace!(%conn_id, error = %e, "close after writer exit");
    }
}
