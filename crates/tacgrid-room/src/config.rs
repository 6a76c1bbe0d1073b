//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tacgrid_board::{DEFAULT_WINNING_LENGTH, MAX_WINNING_LENGTH};
use tracing::warn;

use crate::SYMBOLS;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for the room, fixed when the coordinator is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Number of player slots. At most one per symbol in [`SYMBOLS`].
    pub capacity: usize,

    /// Length of the straight run that wins a game.
    pub winning_length: usize,

    /// How long the winning board stays up before it is cleared.
    pub win_pause: Duration,

    /// Bound of the coordinator's command queue. Senders wait when it
    /// is full.
    pub channel_size: usize,
}

impl RoomConfig {
    /// Largest capacity a room can have: one slot per symbol.
    pub const MAX_CAPACITY: usize = SYMBOLS.len();

    /// Longest winning run a room accepts.
    pub const MAX_WINNING_LENGTH: usize = MAX_WINNING_LENGTH;

    /// Clamps every field into its usable range.
    pub fn validated(mut self) -> Self {
        if self.capacity > Self::MAX_CAPACITY {
            warn!(
                capacity = self.capacity,
                max = Self::MAX_CAPACITY,
                "capacity exceeds the symbol alphabet, clamping"
            );
            self.capacity = Self::MAX_CAPACITY;
        }
        if self.capacity == 0 {
            warn!("capacity of 0 leaves no room to play, using 1");
            self.capacity = 1;
        }
        if self.winning_length > Self::MAX_WINNING_LENGTH {
            warn!(
                winning_length = self.winning_length,
                max = Self::MAX_WINNING_LENGTH,
                "winning_length is too long to scan, clamping"
            );
            self.winning_length = Self::MAX_WINNING_LENGTH;
        }
        if self.winning_length == 0 {
            warn!("winning_length of 0 is meaningless, using 1");
            self.winning_length = 1;
        }
        self.channel_size = self.channel_size.max(1);
        self
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: Self::MAX_CAPACITY,
            winning_length: DEFAULT_WINNING_LENGTH,
            win_pause: Duration::from_secs(5),
            channel_size: 64,
        }
    }
}
