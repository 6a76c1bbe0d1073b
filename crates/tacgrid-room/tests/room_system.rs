//! Integration tests for the room coordinator.
//!
//! The runtime starts paused, so the post-win pause elapses as soon as
//! every task is idle.

use std::time::Duration;

use tacgrid_board::{Cell, Direction, Symbol};
use tacgrid_protocol::{ServerMessage, Snapshot};
use tacgrid_room::{spawn_room, Participant, RoomConfig, RoomError, RoomHandle};
use tacgrid_transport::ConnectionId;
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn config(capacity: usize) -> RoomConfig {
    RoomConfig {
        capacity,
        ..RoomConfig::default()
    }
}

async fn join(room: &RoomHandle, id: u64) -> (ConnectionId, Participant, Inbox) {
    let conn_id = ConnectionId::new(id);
    let (tx, rx) = mpsc::unbounded_channel();
    let participant = room.join(conn_id, tx).await.unwrap();
    (conn_id, participant, rx)
}

async fn next_snapshot(inbox: &mut Inbox) -> Snapshot {
    match inbox.recv().await {
        Some(ServerMessage::Snapshot(snapshot)) => snapshot,
        other => panic!("expected snapshot, got {other:?}"),
    }
}

async fn next_error(inbox: &mut Inbox) -> (u16, String) {
    match inbox.recv().await {
        Some(ServerMessage::Error { code, message }) => (code, message),
        other => panic!("expected error, got {other:?}"),
    }
}

/// Drains whatever is queued right now. Call after `room.info()` so the
/// coordinator has caught up.
fn drain(inbox: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = inbox.try_recv() {
        out.push(msg);
    }
    out
}

// =========================================================================
// Join / leave
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_join_broadcasts_to_everyone() {
    let room = spawn_room(RoomConfig::default());

    let (_, x, mut x_inbox) = join(&room, 1).await;
    assert_eq!(x.symbol, Symbol('X'));
    assert!(x.has_turn);
    let first = next_snapshot(&mut x_inbox).await;
    assert!(first.can_move);
    assert_eq!(first.active_players, "[X]");

    let (_, o, mut o_inbox) = join(&room, 2).await;
    assert_eq!(o.symbol, Symbol('O'));
    assert!(!o.has_turn);

    let for_x = next_snapshot(&mut x_inbox).await;
    let for_o = next_snapshot(&mut o_inbox).await;
    assert!(for_x.can_move);
    assert!(!for_o.can_move);
    assert_eq!(for_o.active_players, "[X]O");
    assert!(for_o.board.cells.is_empty());

    assert!(room.can_move(x.slot));
    assert!(!room.can_move(o.slot));
}

#[tokio::test(start_paused = true)]
async fn test_join_refused_when_full() {
    let room = spawn_room(config(2));
    let _x = join(&room, 1).await;
    let _o = join(&room, 2).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = room.join(ConnectionId::new(3), tx).await;
    assert_eq!(result, Err(RoomError::RoomFull { capacity: 2 }));

    let info = room.info().await.unwrap();
    assert_eq!(info.members, 2);
    assert_eq!(info.queue, "[X]O");
}

#[tokio::test(start_paused = true)]
async fn test_double_join_is_refused() {
    let room = spawn_room(RoomConfig::default());
    let (conn_id, _, _inbox) = join(&room, 1).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = room.join(conn_id, tx).await;
    assert_eq!(result, Err(RoomError::AlreadyInRoom(conn_id)));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_turn_hands_turn_on() {
    let room = spawn_room(RoomConfig::default());
    let (x_id, x, _x_inbox) = join(&room, 1).await;
    let (_, o, mut o_inbox) = join(&room, 2).await;
    drain_after_sync(&room, &mut o_inbox).await;

    room.leave(x_id).await.unwrap();
    let snapshot = next_snapshot(&mut o_inbox).await;
    assert!(snapshot.can_move);
    assert_eq!(snapshot.active_players, "[O]");
    assert!(room.can_move(o.slot));
    assert!(!room.can_move(x.slot));
}

#[tokio::test(start_paused = true)]
async fn test_leave_is_idempotent() {
    let room = spawn_room(RoomConfig::default());
    let (x_id, _, _x_inbox) = join(&room, 1).await;
    let (_, _, mut o_inbox) = join(&room, 2).await;
    drain_after_sync(&room, &mut o_inbox).await;

    room.leave(x_id).await.unwrap();
    room.leave(x_id).await.unwrap();
    room.leave(ConnectionId::new(99)).await.unwrap();

    let info = room.info().await.unwrap();
    assert_eq!(info.members, 1);
    // One broadcast for the one real leave.
    assert_eq!(drain(&mut o_inbox).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_leave_drops_member_channel() {
    let room = spawn_room(RoomConfig::default());
    let (x_id, _, mut x_inbox) = join(&room, 1).await;

    room.leave(x_id).await.unwrap();
    room.info().await.unwrap();
    drain(&mut x_inbox);
    assert!(x_inbox.recv().await.is_none());
}

async fn drain_after_sync(room: &RoomHandle, inbox: &mut Inbox) {
    room.info().await.unwrap();
    drain(inbox);
}

// =========================================================================
// Moves
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_out_of_turn_move_is_rejected_privately() {
    let room = spawn_room(RoomConfig::default());
    let (_, _, mut x_inbox) = join(&room, 1).await;
    let (o_id, _, mut o_inbox) = join(&room, 2).await;
    drain_after_sync(&room, &mut x_inbox).await;
    drain(&mut o_inbox);

    room.submit_move(o_id, Cell::new(0, 0)).await.unwrap();

    let (code, message) = next_error(&mut o_inbox).await;
    assert_eq!(code, 403);
    assert_eq!(message, "please wait your turn");

    let info = room.info().await.unwrap();
    assert_eq!(info.occupied_cells, 0);
    assert!(drain(&mut x_inbox).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_move_on_occupied_cell_is_rejected() {
    let room = spawn_room(RoomConfig::default());
    let (x_id, _, mut x_inbox) = join(&room, 1).await;
    let (o_id, _, mut o_inbox) = join(&room, 2).await;

    room.submit_move(x_id, Cell::new(0, 0)).await.unwrap();
    drain_after_sync(&room, &mut x_inbox).await;
    drain(&mut o_inbox);

    room.submit_move(o_id, Cell::new(0, 0)).await.unwrap();
    let (code, _) = next_error(&mut o_inbox).await;
    assert_eq!(code, 409);

    // Still O's turn after the rejection.
    room.submit_move(o_id, Cell::new(1, 0)).await.unwrap();
    let snapshot = next_snapshot(&mut o_inbox).await;
    assert_eq!(snapshot.board.cells.len(), 2);
    assert_eq!(snapshot.active_players, "[X]O");
}

#[tokio::test(start_paused = true)]
async fn test_move_from_non_member_is_ignored() {
    let room = spawn_room(RoomConfig::default());
    let (_, _, mut x_inbox) = join(&room, 1).await;
    drain_after_sync(&room, &mut x_inbox).await;

    room.submit_move(ConnectionId::new(42), Cell::new(0, 0)).await.unwrap();
    let info = room.info().await.unwrap();
    assert_eq!(info.occupied_cells, 0);
    assert!(drain(&mut x_inbox).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sole_player_moves_repeatedly() {
    let room = spawn_room(RoomConfig::default());
    let (x_id, x, mut x_inbox) = join(&room, 1).await;
    next_snapshot(&mut x_inbox).await;

    for column in 0..3 {
        room.submit_move(x_id, Cell::new(0, column * 2)).await.unwrap();
        let snapshot = next_snapshot(&mut x_inbox).await;
        assert!(snapshot.can_move);
    }
    assert!(room.can_move(x.slot));
}

// =========================================================================
// Full game
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_x_beats_o_then_board_resets() {
    let room = spawn_room(RoomConfig::default());
    let (x_id, x, mut x_inbox) = join(&room, 1).await;
    let (o_id, o, mut o_inbox) = join(&room, 2).await;
    drain_after_sync(&room, &mut x_inbox).await;
    drain(&mut o_inbox);

    // X fills row 0, O fills row 1 one step behind.
    for column in 0..4 {
        room.submit_move(x_id, Cell::new(0, column)).await.unwrap();
        let after_x = next_snapshot(&mut o_inbox).await;
        assert!(after_x.can_move);
        assert_eq!(after_x.active_players, "X[O]");

        room.submit_move(o_id, Cell::new(1, column)).await.unwrap();
        next_snapshot(&mut o_inbox).await;
    }
    drain_after_sync(&room, &mut x_inbox).await;

    room.submit_move(x_id, Cell::new(0, 4)).await.unwrap();

    let won_x = next_snapshot(&mut x_inbox).await;
    let won_o = next_snapshot(&mut o_inbox).await;
    for snapshot in [&won_x, &won_o] {
        assert!(!snapshot.can_move);
        assert_eq!(snapshot.board.winner, Some(Symbol('X')));
        assert_eq!(snapshot.board.cells.len(), 9);
    }
    let line = won_x.board.win_lines.line(Direction::Horizontal).unwrap();
    assert_eq!(line, (0..5).map(|c| Cell::new(0, c)).collect::<Vec<_>>().as_slice());
    assert_eq!(won_x.board.win_lines.lines().count(), 1);

    // Nobody may move while the win is on display.
    assert!(!room.can_move(x.slot));
    assert!(!room.can_move(o.slot));

    // The pause elapses on its own; the winner opens the next game.
    let reset_x = next_snapshot(&mut x_inbox).await;
    let reset_o = next_snapshot(&mut o_inbox).await;
    assert!(reset_x.board.cells.is_empty());
    assert_eq!(reset_x.board.winner, None);
    assert!(reset_x.can_move);
    assert!(!reset_o.can_move);
    assert_eq!(reset_o.active_players, "[X]O");
    assert!(room.can_move(x.slot));
}

#[tokio::test(start_paused = true)]
async fn test_commands_during_pause_run_after_reset() {
    let room = spawn_room(RoomConfig {
        winning_length: 2,
        win_pause: Duration::from_secs(30),
        ..RoomConfig::default()
    });
    let (x_id, _, mut x_inbox) = join(&room, 1).await;
    let (o_id, _, mut o_inbox) = join(&room, 2).await;

    room.submit_move(x_id, Cell::new(0, 0)).await.unwrap();
    room.submit_move(o_id, Cell::new(5, 5)).await.unwrap();
    room.submit_move(x_id, Cell::new(0, 1)).await.unwrap();
    // Queued behind the pause; after the reset it is X's turn again.
    room.submit_move(o_id, Cell::new(7, 7)).await.unwrap();

    let start = tokio::time::Instant::now();
    let info = room.info().await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(info.winner, None);
    assert_eq!(info.occupied_cells, 0);
    assert_eq!(info.queue, "[X]O");

    let errors: Vec<_> = drain(&mut o_inbox)
        .into_iter()
        .filter_map(|msg| match msg {
            ServerMessage::Error { code, .. } => Some(code),
            ServerMessage::Snapshot(_) => None,
        })
        .collect();
    assert_eq!(errors, vec![403]);
    drain(&mut x_inbox);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_room() {
    let room = spawn_room(RoomConfig::default());
    let (_, _, mut x_inbox) = join(&room, 1).await;

    room.shutdown().await.unwrap();
    drain(&mut x_inbox);
    assert!(x_inbox.recv().await.is_none());
    assert_eq!(room.info().await, Err(RoomError::Unavailable));
}
