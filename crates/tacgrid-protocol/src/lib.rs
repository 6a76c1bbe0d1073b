//! Wire protocol for tacgrid.
//!
//! - **Types** ([`MoveRequest`], [`Snapshot`], [`ServerMessage`]) — the
//!   messages that travel between browser and server.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (MoveRequest / ServerMessage) → Room
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    codes, BoardView, CellState, MoveRequest, ServerMessage, Snapshot,
};
