//! Error types for the room layer.

use tacgrid_board::Cell;
use tacgrid_protocol::codes;
use tacgrid_transport::ConnectionId;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Every slot is taken.
    #[error("room is full ({capacity} players)")]
    RoomFull { capacity: usize },

    /// The connection already holds a slot.
    #[error("{0} already joined the room")]
    AlreadyInRoom(ConnectionId),

    /// The submitter does not hold the turn.
    #[error("please wait your turn")]
    NotYourTurn,

    /// The target cell has an occupant.
    #[error("cell {0} is already taken")]
    CellOccupied(Cell),

    /// The board is showing a win and will be cleared shortly.
    #[error("the game is over, a new one starts shortly")]
    GameOver,

    /// The coordinator's command channel is closed.
    #[error("room is unavailable")]
    Unavailable,
}

impl RoomError {
    /// The code sent to the client in a
    /// [`ServerMessage::Error`](tacgrid_protocol::ServerMessage::Error).
    pub fn code(&self) -> u16 {
        match self {
            Self::RoomFull { .. } => codes::ROOM_FULL,
            Self::AlreadyInRoom(_) => codes::ALREADY_JOINED,
            Self::NotYourTurn => codes::NOT_YOUR_TURN,
            Self::CellOccupied(_) => codes::CELL_OCCUPIED,
            Self::GameOver => codes::GAME_OVER,
            Self::Unavailable => codes::ROOM_UNAVAILABLE,
        }
    }
}
