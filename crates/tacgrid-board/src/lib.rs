//! Board and win detection for tacgrid.
//!
//! The board is unbounded: cells are addressed by signed integer
//! coordinates and stored sparsely, so only occupied cells cost memory.
//! After each move only the four lines through the played cell are
//! scanned, which keeps win detection independent of board size.
//!
//! # Key types
//!
//! - [`Board`] — occupancy map plus the current [`WinResult`]
//! - [`Cell`] — a `(row, column)` coordinate
//! - [`Symbol`] — the marker a participant places
//! - [`Direction`] — the four axes a line can run along

mod board;
mod types;

pub use board::{Board, DEFAULT_WINNING_LENGTH, EMPTY_MARK, MAX_WINNING_LENGTH};
pub use types::{Cell, Direction, Symbol, WinResult};
