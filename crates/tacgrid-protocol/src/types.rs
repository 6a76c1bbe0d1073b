//! Message types that travel on the wire.
//!
//! Field names are PascalCase (`Row`, `CanMove`, `WinLines`) because that
//! is what the browser client reads.

use serde::{Deserialize, Serialize};
use tacgrid_board::{Board, Cell, Symbol, WinResult};

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// HTTP-style codes carried by [`ServerMessage::Error`].
pub mod codes {
    /// The move message could not be decoded. The session ends.
    pub const MALFORMED_MOVE: u16 = 400;
    /// A move arrived while it was someone else's turn.
    pub const NOT_YOUR_TURN: u16 = 403;
    /// The target cell is already taken.
    pub const CELL_OCCUPIED: u16 = 409;
    /// The connection asked to join a room it already plays in.
    pub const ALREADY_JOINED: u16 = 422;
    /// The game has been won; the board is about to reset.
    pub const GAME_OVER: u16 = 423;
    /// The room has shut down and takes no more requests.
    pub const ROOM_UNAVAILABLE: u16 = 500;
    /// Every slot in the room is taken. The connection is closed.
    pub const ROOM_FULL: u16 = 503;
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// A participant's request to put their symbol on a cell.
///
/// `{"Row": 3, "Column": -1}`; lowercase keys are accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoveRequest {
    #[serde(alias = "row")]
    pub row: i64,
    #[serde(alias = "column")]
    pub column: i64,
}

impl MoveRequest {
    pub fn cell(self) -> Cell {
        Cell::new(self.row, self.column)
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// One occupied cell in a [`BoardView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CellState {
    pub row: i64,
    pub column: i64,
    pub symbol: Symbol,
}

/// The board as every client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoardView {
    /// Occupied cells, ordered by row then column.
    pub cells: Vec<CellState>,
    /// Winning runs, one entry per direction that has one.
    pub win_lines: WinResult,
    /// The winning symbol, `null` while the game is open.
    pub winner: Option<Symbol>,
}

impl From<&Board> for BoardView {
    fn from(board: &Board) -> Self {
        Self {
            cells: board
                .occupied()
                .into_iter()
                .map(|(cell, symbol)| CellState {
                    row: cell.row,
                    column: cell.column,
                    symbol,
                })
                .collect(),
            win_lines: board.win_result().clone(),
            winner: board.winner(),
        }
    }
}

/// A per-recipient projection of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    /// Whether the recipient may move right now.
    pub can_move: bool,
    /// Symbols in turn order with the current one bracketed, e.g. `"X[O]1"`.
    pub active_players: String,
    pub board: BoardView,
}

/// Everything the server sends to a client.
///
/// Internally tagged on `"Type"`:
/// `{"Type": "Error", "Code": 403, "Message": "please wait your turn"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum ServerMessage {
    /// Game state after a join, leave, move, win or reset.
    Snapshot(Snapshot),

    /// Something the client did was rejected. See [`codes`].
    #[serde(rename_all = "PascalCase")]
    Error { code: u16, message: String },
}

impl ServerMessage {
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
