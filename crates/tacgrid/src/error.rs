//! Unified error type for the tacgrid server.

use tacgrid_protocol::ProtocolError;
use tacgrid_room::RoomError;
use tacgrid_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TacgridError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),
}
