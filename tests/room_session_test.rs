//! Integration tests for the room registry and turn state machine.
//!
//! Connections are simulated with unbounded channels, the same push
//! handle the WebSocket layer uses, so every emission the server
//! would send is observable synchronously with `try_recv`.

use tactix::protocol::ServerMessage;
use tactix::{ConnId, Mark, Outbox, SessionManager};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

struct TestConn {
    id: ConnId,
    outbox: Outbox,
    inbox: UnboundedReceiver<ServerMessage>,
}

fn connect(sessions: &SessionManager) -> TestConn {
    let (outbox, inbox) = unbounded_channel();
    TestConn {
        id: sessions.register_connection(),
        outbox,
        inbox,
    }
}

impl TestConn {
    fn join(&self, sessions: &SessionManager, room: &str) {
        sessions.join(self.id, self.outbox.clone(), room);
    }

    fn recv(&mut self) -> ServerMessage {
        self.inbox.try_recv().expect("expected a pending message")
    }

    fn assert_silent(&mut self) {
        assert!(
            self.inbox.try_recv().is_err(),
            "expected no pending messages"
        );
    }

    fn drain(&mut self) {
        while self.inbox.try_recv().is_ok() {}
    }
}

/// Seats two connections in `room` and drains their join traffic.
fn paired_room(sessions: &SessionManager, room: &str) -> (TestConn, TestConn) {
    let mut a = connect(sessions);
    let mut b = connect(sessions);
    a.join(sessions, room);
    b.join(sessions, room);
    a.drain();
    b.drain();
    (a, b)
}

#[test]
fn test_first_joiner_gets_x() {
    let sessions = SessionManager::new();
    let mut a = connect(&sessions);
    a.join(&sessions, "r1");

    assert_eq!(
        a.recv(),
        ServerMessage::Init {
            symbol: Mark::X,
            board: [None; 9],
            turn: Mark::X,
            players: 1,
        }
    );
    // No start signal until a second participant arrives
    a.assert_silent();
}

#[test]
fn test_second_joiner_gets_o_and_both_start() {
    let sessions = SessionManager::new();
    let mut a = connect(&sessions);
    let mut b = connect(&sessions);
    a.join(&sessions, "r1");
    a.drain();
    b.join(&sessions, "r1");

    assert_eq!(
        b.recv(),
        ServerMessage::Init {
            symbol: Mark::O,
            board: [None; 9],
            turn: Mark::X,
            players: 2,
        }
    );
    assert_eq!(b.recv(), ServerMessage::Start);
    assert_eq!(a.recv(), ServerMessage::Start);
}

#[test]
fn test_third_join_rejected_with_full() {
    let sessions = SessionManager::new();
    let (_a, _b) = paired_room(&sessions, "r1");

    let mut c = connect(&sessions);
    c.join(&sessions, "r1");
    assert_eq!(c.recv(), ServerMessage::Full);

    // The rejected connection stayed in the lobby: its moves go nowhere
    sessions.apply_move(c.id, 0);
    c.assert_silent();
}

#[test]
fn test_move_broadcasts_update_to_both() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    sessions.apply_move(a.id, 4);

    let mut board = [None; 9];
    board[4] = Some(Mark::X);
    let expected = ServerMessage::Update {
        board,
        turn: Mark::O,
        winner: None,
        winning_line: None,
    };
    assert_eq!(a.recv(), expected);
    assert_eq!(b.recv(), expected);
}

#[test]
fn test_top_row_win_scenario() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    // X takes the top row while O plays the middle row
    sessions.apply_move(a.id, 0);
    sessions.apply_move(b.id, 3);
    sessions.apply_move(a.id, 1);
    sessions.apply_move(b.id, 4);
    sessions.apply_move(a.id, 2);

    let last = {
        let mut last = b.recv();
        while let Ok(next) = b.inbox.try_recv() {
            last = next;
        }
        last
    };
    let ServerMessage::Update {
        board,
        turn,
        winner,
        winning_line,
    } = last
    else {
        panic!("expected a final update, got {last:?}");
    };
    assert_eq!(winner, Some(Mark::X));
    assert_eq!(winning_line, Some([0, 1, 2]));
    // The turn does not flip on the winning move
    assert_eq!(turn, Mark::X);
    assert_eq!(board[0], Some(Mark::X));
    assert_eq!(board[1], Some(Mark::X));
    assert_eq!(board[2], Some(Mark::X));

    // Finished room accepts no further moves
    a.drain();
    sessions.apply_move(b.id, 5);
    a.assert_silent();
    b.assert_silent();
}

#[test]
fn test_move_before_pairing_ignored() {
    let sessions = SessionManager::new();
    let mut a = connect(&sessions);
    a.join(&sessions, "r1");
    a.drain();

    sessions.apply_move(a.id, 0);
    a.assert_silent();
}

#[test]
fn test_move_out_of_turn_ignored() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    // O tries to move first
    sessions.apply_move(b.id, 0);
    a.assert_silent();
    b.assert_silent();
}

#[test]
fn test_move_to_occupied_cell_ignored() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    sessions.apply_move(a.id, 4);
    a.drain();
    b.drain();

    sessions.apply_move(b.id, 4);
    a.assert_silent();
    b.assert_silent();
}

#[test]
fn test_move_out_of_range_ignored() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    sessions.apply_move(a.id, 9);
    sessions.apply_move(a.id, usize::MAX);
    a.assert_silent();
    b.assert_silent();
}

#[test]
fn test_draw_game() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    // Legal alternating sequence filling the board with no line:
    //   X O X
    //   X O O
    //   O X X
    for (conn, cell) in [
        (a.id, 0),
        (b.id, 1),
        (a.id, 2),
        (b.id, 4),
        (a.id, 3),
        (b.id, 5),
        (a.id, 7),
        (b.id, 6),
        (a.id, 8),
    ] {
        sessions.apply_move(conn, cell);
    }

    let mut last = a.recv();
    while let Ok(next) = a.inbox.try_recv() {
        last = next;
    }
    let ServerMessage::Update { board, winner, .. } = last else {
        panic!("expected a final update, got {last:?}");
    };
    assert_eq!(winner, None);
    assert!(board.iter().all(|cell| cell.is_some()));

    // Drawn board is terminal until a restart
    b.drain();
    sessions.apply_move(b.id, 0);
    a.assert_silent();
    b.assert_silent();
    sessions.restart(b.id);
    assert!(matches!(a.recv(), ServerMessage::Restart { .. }));
}

#[test]
fn test_restart_resets_and_preserves_marks() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    // X wins the left column
    sessions.apply_move(a.id, 0);
    sessions.apply_move(b.id, 1);
    sessions.apply_move(a.id, 3);
    sessions.apply_move(b.id, 2);
    sessions.apply_move(a.id, 6);
    a.drain();
    b.drain();

    sessions.restart(b.id);
    let expected = ServerMessage::Restart {
        board: [None; 9],
        turn: Mark::X,
    };
    assert_eq!(a.recv(), expected);
    assert_eq!(b.recv(), expected);

    // A kept X: the first move of the new game is theirs
    sessions.apply_move(b.id, 4);
    b.assert_silent();
    sessions.apply_move(a.id, 4);
    let mut board = [None; 9];
    board[4] = Some(Mark::X);
    assert_eq!(
        b.recv(),
        ServerMessage::Update {
            board,
            turn: Mark::O,
            winner: None,
            winning_line: None,
        }
    );
}

#[test]
fn test_restart_of_unfinished_game_ignored() {
    let sessions = SessionManager::new();
    let (mut a, mut b) = paired_room(&sessions, "r1");

    sessions.apply_move(a.id, 0);
    a.drain();
    b.drain();

    sessions.restart(b.id);
    a.assert_silent();
    b.assert_silent();
}

#[test]
fn test_restart_from_lobby_ignored() {
    let sessions = SessionManager::new();
    let mut c = connect(&sessions);
    sessions.restart(c.id);
    c.assert_silent();
}

#[test]
fn test_disconnect_of_last_participant_destroys_room() {
    let sessions = SessionManager::new();
    let mut a = connect(&sessions);
    a.join(&sessions, "r1");
    a.drain();
    assert_eq!(sessions.room_keys(), vec!["r1".to_string()]);

    sessions.disconnect(a.id);
    assert!(sessions.room_keys().is_empty());

    // The key is fresh again: the next joiner is the first arrival
    let mut d = connect(&sessions);
    d.join(&sessions, "r1");
    assert!(matches!(
        d.recv(),
        ServerMessage::Init {
            symbol: Mark::X,
            players: 1,
            ..
        }
    ));
}

#[test]
fn test_disconnect_notifies_remaining_participant() {
    let sessions = SessionManager::new();
    let (a, mut b) = paired_room(&sessions, "r1");

    sessions.disconnect(a.id);
    assert_eq!(b.recv(), ServerMessage::OpponentLeft);

    // Room survives with one seat taken, but moves need a full room
    assert_eq!(sessions.room_keys(), vec!["r1".to_string()]);
    sessions.apply_move(b.id, 0);
    b.assert_silent();

    sessions.disconnect(b.id);
    assert!(sessions.room_keys().is_empty());
}

#[test]
fn test_stale_events_after_disconnect_are_noops() {
    let sessions = SessionManager::new();
    let (a, mut b) = paired_room(&sessions, "r1");

    sessions.disconnect(a.id);
    b.drain();

    // The departed connection's tag is gone; nothing it sends lands
    sessions.apply_move(a.id, 0);
    sessions.restart(a.id);
    b.assert_silent();
}

#[test]
fn test_join_while_seated_ignored() {
    let sessions = SessionManager::new();
    let mut a = connect(&sessions);
    a.join(&sessions, "r1");
    a.drain();

    a.join(&sessions, "r2");
    a.assert_silent();
    // The second key was never registered
    assert_eq!(sessions.room_keys(), vec!["r1".to_string()]);
}

#[test]
fn test_rooms_are_independent() {
    let sessions = SessionManager::new();
    let (mut a1, mut b1) = paired_room(&sessions, "r1");
    let (mut a2, mut b2) = paired_room(&sessions, "r2");

    sessions.apply_move(a1.id, 0);

    assert!(matches!(a1.recv(), ServerMessage::Update { .. }));
    assert!(matches!(b1.recv(), ServerMessage::Update { .. }));
    a2.assert_silent();
    b2.assert_silent();
}
