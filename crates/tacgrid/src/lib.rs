//! # tacgrid
//!
//! A multi-player "N in a row" game server. Players connect over
//! WebSocket, take turns placing their symbol on an unbounded grid, and
//! the first straight run of the winning length (default 5) wins. The
//! winning board stays up for a few seconds, then a new game starts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tacgrid::prelude::*;
//!
//! # async fn start() -> Result<(), TacgridError> {
//! let server = TacgridServer::builder()
//!     .bind("127.0.0.1:7777")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::TacgridError;
pub use server::{
    TacgridServer, TacgridServerBuilder, DEFAULT_BIND_ADDR, DEFAULT_HANDSHAKE_TIMEOUT,
};

pub mod prelude {
    pub use crate::{
        TacgridError, TacgridServer, TacgridServerBuilder, DEFAULT_BIND_ADDR,
        DEFAULT_HANDSHAKE_TIMEOUT,
    };
    pub use tacgrid_board::{Cell, Direction, Symbol};
    pub use tacgrid_protocol::{codes, BoardView, MoveRequest, ServerMessage, Snapshot};
    pub use tacgrid_room::{RoomConfig, RoomError, RoomHandle, RoomInfo};
}
