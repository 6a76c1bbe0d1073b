//! `TacgridServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → room. One room
//! coordinator is spawned per server and every connection gets a handle
//! to it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tacgrid_protocol::{Codec, JsonCodec};
use tacgrid_room::{spawn_room, RoomConfig, RoomHandle};
use tacgrid_transport::{Transport, TransportError, WebSocketTransport};

use crate::handler::handle_connection;
use crate::TacgridError;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7777";

/// How long a new socket gets to finish the WebSocket upgrade.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) room: RoomHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a tacgrid server.
///
/// # Example
///
/// ```rust,no_run
/// use tacgrid::prelude::*;
///
/// # async fn start() -> Result<(), TacgridError> {
/// let server = TacgridServer::builder()
///     .bind("0.0.0.0:7777")
///     .room_config(RoomConfig { capacity: 4, ..RoomConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TacgridServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    handshake_timeout: Duration,
}

impl TacgridServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            room_config: RoomConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets how long a new socket gets to finish the WebSocket upgrade
    /// before it is dropped.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and spawns the room coordinator.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<TacgridServer<JsonCodec>, TacgridError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let room = spawn_room(self.room_config);

        Ok(TacgridServer {
            transport,
            handshake_timeout: self.handshake_timeout,
            state: Arc::new(ServerState {
                room,
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for TacgridServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound tacgrid server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TacgridServer<C: Codec> {
    transport: WebSocketTransport,
    handshake_timeout: Duration,
    state: Arc<ServerState<C>>,
}

impl TacgridServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> TacgridServerBuilder {
        TacgridServerBuilder::new()
    }
}

impl<C: Codec> TacgridServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the room, e.g. to shut it down.
    pub fn room(&self) -> RoomHandle {
        self.state.room.clone()
    }

    /// Runs the accept loop.
    ///
    /// The loop only takes raw sockets; the WebSocket upgrade and the
    /// session run in a task per connection, so a peer that stalls its
    /// handshake holds up nobody else. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), TacgridError> {
        tracing::info!(addr = ?self.local_addr().ok(), "tacgrid server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    let handshake_timeout = self.handshake_timeout;
                    tokio::spawn(async move {
                        let peer = incoming.peer_addr();
                        let conn = match tokio::time::timeout(
                            handshake_timeout,
                            WebSocketTransport::upgrade(incoming),
                        )
                        .await
                        {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                            Err(_) => {
                                let e = TransportError::HandshakeTimedOut(handshake_timeout);
                                tracing::debug!(%peer, error = %e, "dropping connection");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
