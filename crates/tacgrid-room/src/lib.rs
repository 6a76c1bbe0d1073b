//! Turn order and room coordination for tacgrid.
//!
//! The room runs as one Tokio task (actor model) that owns the board and
//! the turn order. Connections talk to it through a [`RoomHandle`].
//!
//! # Key types
//!
//! - [`RoomHandle`] — send commands to the running coordinator
//! - [`TurnManager`] — slot allocation and turn rotation
//! - [`RoomConfig`] — capacity, winning length, post-win pause
//! - [`RoomError`] — rejections, each with a client-facing code

mod config;
mod error;
mod players;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use players::{Participant, PlayerSlot, TurnManager, SYMBOLS};
pub use room::{spawn_room, PlayerSender, RoomHandle, RoomInfo};
