//! Room coordinator: a single Tokio task that owns the board and the
//! turn order.
//!
//! Every mutation (join, leave, move, the post-win reset) arrives as a
//! command on one mpsc channel and is applied in arrival order, so the
//! board and the turn order never need a lock. The only state readable
//! from outside is the current turn holder, published on a `watch`
//! channel so connection tasks can check eligibility without a round
//! trip through the queue.

use std::collections::HashMap;

use tacgrid_board::{Board, Cell, Symbol};
use tacgrid_protocol::{BoardView, ServerMessage, Snapshot};
use tacgrid_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

use crate::{Participant, PlayerSlot, RoomConfig, RoomError, TurnManager};

/// Channel sender for delivering outbound messages to a participant.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to the coordinator through its channel.
pub(crate) enum RoomCommand {
    /// Claim a slot for a connection.
    Join {
        conn_id: ConnectionId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Participant, RoomError>>,
    },

    /// Give up a connection's slot. Unknown connections are ignored.
    Leave { conn_id: ConnectionId },

    /// Place the connection's symbol on a cell.
    Move { conn_id: ConnectionId, cell: Cell },

    /// Request a summary of the room.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Stop the coordinator.
    Shutdown,
}

/// A summary of the room, mostly for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// Connections currently holding a slot.
    pub members: usize,
    /// Slots in the room.
    pub capacity: usize,
    /// Turn order with the holder bracketed.
    pub queue: String,
    /// Occupied cells on the board.
    pub occupied_cells: usize,
    /// Winner of the game on display, if any.
    pub winner: Option<Symbol>,
}

// ---------------------------------------------------------------------------
// RoomHandle
// ---------------------------------------------------------------------------

/// Handle to the running coordinator.
///
/// Cheap to clone: an `mpsc::Sender` plus a `watch::Receiver`. Every
/// connection task holds one.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
    turn: watch::Receiver<Option<PlayerSlot>>,
}

impl RoomHandle {
    /// Asks for a slot.
    ///
    /// On success the connection is a member and `sender` starts receiving
    /// snapshots. The reply can be delayed by a post-win pause.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when no slot is free, or
    /// [`RoomError::Unavailable`] when the coordinator is gone.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        sender: PlayerSender,
    ) -> Result<Participant, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)?
    }

    /// Gives up the connection's slot (fire-and-forget).
    pub async fn leave(&self, conn_id: ConnectionId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Leave { conn_id })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Submits a move (fire-and-forget). Rejections come back to the
    /// submitter as a [`ServerMessage::Error`].
    pub async fn submit_move(
        &self,
        conn_id: ConnectionId,
        cell: Cell,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Move { conn_id, cell })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// `true` if `slot` holds the turn and no win is on display.
    ///
    /// Reads the last published state without waiting on the coordinator.
    /// The coordinator checks again before applying a move.
    pub fn can_move(&self, slot: PlayerSlot) -> bool {
        *self.turn.borrow() == Some(slot)
    }

    /// The slot that holds the turn, `None` while the room is empty or a
    /// win is on display.
    pub fn turn_holder(&self) -> Option<PlayerSlot> {
        *self.turn.borrow()
    }

    /// Requests a summary of the room.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the coordinator to stop. Members' channels are dropped, which
    /// ends their writer tasks.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

struct Member {
    slot: PlayerSlot,
    symbol: Symbol,
    sender: PlayerSender,
}

/// The coordinator state. Runs inside a Tokio task.
struct RoomActor {
    config: RoomConfig,
    board: Board,
    turns: TurnManager,
    members: HashMap<ConnectionId, Member>,
    turn_tx: watch::Sender<Option<PlayerSlot>>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until shutdown or until every handle is gone.
    async fn run(mut self) {
        info!(
            capacity = self.turns.capacity(),
            winning_length = self.board.winning_length(),
            "room coordinator started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn_id, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn_id } => {
                    self.handle_leave(conn_id);
                }
                RoomCommand::Move { conn_id, cell } => {
                    if self.handle_move(conn_id, cell) {
                        self.finish_game().await;
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    info!("room shutting down");
                    break;
                }
            }
        }

        info!("room coordinator stopped");
    }

    fn handle_join(
        &mut self,
        conn_id: ConnectionId,
        sender: PlayerSender,
    ) -> Result<Participant, RoomError> {
        if self.members.contains_key(&conn_id) {
            return Err(RoomError::AlreadyInRoom(conn_id));
        }

        let participant = self.turns.add_participant().inspect_err(|_| {
            warn!(%conn_id, capacity = self.turns.capacity(), "room full, join refused");
        })?;

        self.members.insert(
            conn_id,
            Member {
                slot: participant.slot,
                symbol: participant.symbol,
                sender,
            },
        );
        info!(
            %conn_id,
            slot = %participant.slot,
            symbol = %participant.symbol,
            players = self.turns.active_count(),
            "player joined"
        );

        self.publish_turn();
        self.broadcast();
        Ok(participant)
    }

    fn handle_leave(&mut self, conn_id: ConnectionId) {
        let Some(member) = self.members.remove(&conn_id) else {
            debug!(%conn_id, "leave from non-member, ignoring");
            return;
        };

        self.turns.remove_participant(member.slot);
        info!(
            %conn_id,
            slot = %member.slot,
            symbol = %member.symbol,
            players = self.turns.active_count(),
            "player left"
        );

        self.publish_turn();
        self.broadcast();
    }

    /// Applies a move. Returns `true` if it won the game.
    fn handle_move(&mut self, conn_id: ConnectionId, cell: Cell) -> bool {
        let Some(member) = self.members.get(&conn_id) else {
            warn!(%conn_id, %cell, "move from non-member, ignoring");
            return false;
        };
        let (slot, symbol) = (member.slot, member.symbol);

        if let Err(err) = self.validate_move(slot, cell) {
            debug!(%conn_id, %cell, %err, "move rejected");
            self.send_to(conn_id, ServerMessage::error(err.code(), err.to_string()));
            return false;
        }

        self.board.place(cell, symbol);
        debug!(%conn_id, %symbol, %cell, "move applied");

        if self.board.check_win(cell).has_win() {
            return true;
        }

        self.turns.advance_turn();
        self.publish_turn();
        self.broadcast();
        false
    }

    fn validate_move(&self, slot: PlayerSlot, cell: Cell) -> Result<(), RoomError> {
        if self.board.winner().is_some() {
            return Err(RoomError::GameOver);
        }
        if !self.turns.can_move(slot) {
            return Err(RoomError::NotYourTurn);
        }
        if !self.board.is_free(cell) {
            return Err(RoomError::CellOccupied(cell));
        }
        Ok(())
    }

    /// Shows the winning board, waits out the pause, then clears it.
    ///
    /// The turn is not advanced: the winner opens the next game if they
    /// are still here. Commands queue up while this runs.
    async fn finish_game(&mut self) {
        if let Some(winner) = self.board.winner() {
            let lines: Vec<String> = self
                .board
                .win_result()
                .lines()
                .map(|(direction, _)| direction.to_string())
                .collect();
            info!(%winner, ?lines, players = %self.turns.active_symbols(), "game won");
        }

        self.turn_tx.send_replace(None);
        self.broadcast();

        tokio::time::sleep(self.config.win_pause).await;

        self.board.reset();
        self.publish_turn();
        self.broadcast();
        info!(queue = %self.turns.queue_status(), "board reset");
    }

    fn publish_turn(&self) {
        let holder = match self.board.winner() {
            Some(_) => None,
            None => self.turns.current().map(|p| p.slot),
        };
        self.turn_tx.send_replace(holder);
    }

    /// Sends every member a snapshot of the current state.
    fn broadcast(&self) {
        let view = BoardView::from(&self.board);
        let queue = self.turns.queue_status();
        let game_open = self.board.winner().is_none();

        for member in self.members.values() {
            let snapshot = Snapshot {
                can_move: game_open && self.turns.can_move(member.slot),
                active_players: queue.clone(),
                board: view.clone(),
            };
            let _ = member.sender.send(ServerMessage::Snapshot(snapshot));
        }

        trace!(
            members = self.members.len(),
            players = %self.turns.active_symbols(),
            cells = self.board.len(),
            "snapshot broadcast"
        );
    }

    /// Sends a message to one member. Silently drops it if their
    /// connection is gone.
    fn send_to(&self, conn_id: ConnectionId, msg: ServerMessage) {
        if let Some(member) = self.members.get(&conn_id) {
            let _ = member.sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            members: self.members.len(),
            capacity: self.turns.capacity(),
            queue: self.turns.queue_status(),
            occupied_cells: self.board.len(),
            winner: self.board.winner(),
        }
    }
}

/// Spawns the room coordinator and returns a handle to it.
///
/// Must be called inside a Tokio runtime.
pub fn spawn_room(config: RoomConfig) -> RoomHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.channel_size);
    let (turn_tx, turn_rx) = watch::channel(None);

    let actor = RoomActor {
        board: Board::new(config.winning_length),
        turns: TurnManager::new(config.capacity),
        members: HashMap::new(),
        turn_tx,
        receiver: rx,
        config,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        sender: tx,
        turn: turn_rx,
    }
}
