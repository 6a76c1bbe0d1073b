//! Player slots and turn order.
//!
//! The room has a fixed arena of slots. A slot goes `Free → Active →
//! Disconnected` and never comes back. A player who reconnects gets a
//! fresh slot and symbol.
//!
//! ```text
//! slots:  [ X ][ O ][ 1 ][ 2 ] ...
//!          act  disc act  free
//!           ^ turn
//! ```
//!
//! Turns rotate in slot order, skipping anything that is not Active.

use std::fmt;

use serde::{Deserialize, Serialize};
use tacgrid_board::Symbol;

use crate::RoomError;

/// Symbols handed out to slots, in slot order.
pub const SYMBOLS: [char; 11] = ['X', 'O', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

// ---------------------------------------------------------------------------
// PlayerSlot / Participant
// ---------------------------------------------------------------------------

/// Index of a slot in the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerSlot(usize);

impl PlayerSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// A player bound to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub slot: PlayerSlot,
    pub symbol: Symbol,
    pub has_turn: bool,
}

#[derive(Debug, Clone, Copy)]
enum SlotState {
    Free,
    Active(Participant),
    Disconnected,
}

// ---------------------------------------------------------------------------
// TurnManager
// ---------------------------------------------------------------------------

/// Slot allocation and turn rotation.
///
/// Exactly one Active participant holds the turn whenever at least one is
/// Active. Not synchronized: the room coordinator owns it.
#[derive(Debug)]
pub struct TurnManager {
    slots: Vec<SlotState>,
    active: usize,
    current: Option<PlayerSlot>,
}

impl TurnManager {
    /// Creates an arena of `capacity` free slots, clamped to
    /// `1..=SYMBOLS.len()`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, SYMBOLS.len());
        Self {
            slots: vec![SlotState::Free; capacity],
            active: 0,
            current: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Binds a new participant to the first free slot.
    ///
    /// The first participant of an empty room receives the turn.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when no slot is free. Disconnected slots
    /// are not reused.
    pub fn add_participant(&mut self) -> Result<Participant, RoomError> {
        let index = self
            .slots
            .iter()
            .position(|s| matches!(s, SlotState::Free))
            .ok_or(RoomError::RoomFull {
                capacity: self.capacity(),
            })?;

        let slot = PlayerSlot(index);
        let mut participant = Participant {
            slot,
            symbol: Symbol(SYMBOLS[index]),
            has_turn: false,
        };
        if self.current.is_none() {
            participant.has_turn = true;
            self.current = Some(slot);
        }

        self.slots[index] = SlotState::Active(participant);
        self.active += 1;
        Ok(participant)
    }

    /// Marks a participant's slot Disconnected, passing the turn on first
    /// if they held it. Unknown or already removed slots are ignored.
    pub fn remove_participant(&mut self, slot: PlayerSlot) -> Option<Participant> {
        let participant = self.participant(slot)?;

        if participant.has_turn {
            if self.active > 1 {
                self.advance_turn();
            } else {
                self.current = None;
            }
        }

        self.slots[slot.0] = SlotState::Disconnected;
        self.active -= 1;
        Some(participant)
    }

    /// `true` if the slot is Active and holds the turn.
    pub fn can_move(&self, slot: PlayerSlot) -> bool {
        self.participant(slot).is_some_and(|p| p.has_turn)
    }

    /// Passes the turn to the next Active slot after the current one,
    /// wrapping around. A sole participant keeps it.
    pub fn advance_turn(&mut self) -> Option<Participant> {
        if self.active == 0 {
            return None;
        }

        let capacity = self.capacity();
        let from = match self.current {
            Some(slot) => {
                if let Some(SlotState::Active(p)) = self.slots.get_mut(slot.0) {
                    p.has_turn = false;
                }
                slot.0
            }
            None => capacity - 1,
        };

        for step in 1..=capacity {
            let index = (from + step) % capacity;
            if let SlotState::Active(p) = &mut self.slots[index] {
                p.has_turn = true;
                self.current = Some(p.slot);
                return Some(*p);
            }
        }
        None
    }

    pub fn participant(&self, slot: PlayerSlot) -> Option<Participant> {
        match self.slots.get(slot.0) {
            Some(SlotState::Active(p)) => Some(*p),
            _ => None,
        }
    }

    /// The participant holding the turn.
    pub fn current(&self) -> Option<Participant> {
        self.current.and_then(|slot| self.participant(slot))
    }

    fn active_participants(&self) -> impl Iterator<Item = &Participant> {
        self.slots.iter().filter_map(|s| match s {
            SlotState::Active(p) => Some(p),
            _ => None,
        })
    }

    /// Symbols of every Active participant in turn order, e.g. `"XO1"`.
    pub fn active_symbols(&self) -> String {
        self.active_participants().map(|p| p.symbol.as_char()).collect()
    }

    /// Like [`active_symbols`](Self::active_symbols) with the turn holder
    /// bracketed, e.g. `"X[O]1"`.
    pub fn queue_status(&self) -> String {
        let mut out = String::new();
        for p in self.active_participants() {
            if p.has_turn {
                out.push('[');
                out.push(p.symbol.as_char());
                out.push(']');
            } else {
                out.push(p.symbol.as_char());
            }
        }
        out
    }
}
