//! Room and session management.
//!
//! The [`SessionManager`] owns the only shared mutable state in the
//! process: the registry mapping room keys to live rooms, and the tag
//! map linking each connection to its room and mark. Both live behind
//! a single mutex so a connection tag is always mutated in the same
//! critical section as the room's participant list, and at most one
//! handler mutates the registry at any instant.
//!
//! Every handler here treats malformed or out-of-state input as a
//! silent no-op. One misbehaving connection never crashes the process
//! or perturbs another room; the sole explicit rejection a client ever
//! sees is the `full` notice on joining a room at capacity.

use crate::game::{Board, Mark, rules};
use crate::protocol::ServerMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Caller-supplied key identifying a room.
pub type RoomKey = String;

/// Identity of a live connection, allocated by [`SessionManager::register_connection`].
pub type ConnId = u64;

/// Push handle for delivering messages to one connection.
///
/// Sends are fire-and-forget: delivery failure to a closing socket is
/// discovered by the transport, not here.
pub type Outbox = UnboundedSender<ServerMessage>;

/// Derived lifecycle state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Fewer than two participants; moves are not accepted yet.
    Waiting,
    /// Two participants, game ongoing.
    InProgress,
    /// Winner recorded or board full. Only restart leaves this state.
    Finished,
}

/// A connection seated in a room.
#[derive(Debug, Clone)]
struct Participant {
    conn: ConnId,
    mark: Mark,
    outbox: Outbox,
}

/// Back-reference from a connection to its room.
///
/// The room owns the authoritative participant list; this is a cached
/// lookup key, cleared whenever the room removes the participant.
#[derive(Debug, Clone)]
struct RoomTag {
    room: RoomKey,
    mark: Mark,
}

/// One game session.
#[derive(Debug)]
struct Room {
    board: Board,
    turn: Mark,
    winner: Option<Mark>,
    participants: Vec<Participant>,
}

impl Room {
    fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            winner: None,
            participants: Vec::new(),
        }
    }

    fn status(&self) -> RoomStatus {
        if self.winner.is_some() || rules::is_full(&self.board) {
            RoomStatus::Finished
        } else if self.participants.len() < 2 {
            RoomStatus::Waiting
        } else {
            RoomStatus::InProgress
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        for p in &self.participants {
            // A closed outbox means the socket is going away; its
            // disconnect transition will clean up shortly.
            let _ = p.outbox.send(msg.clone());
        }
    }
}

/// Shared mutable state: the room registry plus the connection tags.
#[derive(Debug, Default)]
struct Registry {
    rooms: HashMap<RoomKey, Room>,
    tags: HashMap<ConnId, RoomTag>,
}

/// Owns all rooms and routes connection events to them.
///
/// Constructed once at process start and cloned (cheaply, via `Arc`)
/// into every connection handler.
#[derive(Debug, Clone)]
pub struct SessionManager {
    registry: Arc<Mutex<Registry>>,
    next_conn: Arc<AtomicU64>,
}

impl SessionManager {
    /// Creates a new session manager with an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            next_conn: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Allocates an identity for a freshly accepted connection.
    ///
    /// The connection starts in the lobby: no room, no mark.
    pub fn register_connection(&self) -> ConnId {
        self.next_conn.fetch_add(1, Ordering::Relaxed)
    }

    /// Seats a connection in the room with the given key.
    ///
    /// Creates the room when the key is unseen. The first arrival is
    /// assigned X, the second O. A join to a full room leaves the
    /// connection in the lobby and answers with a `full` notice; a
    /// join from an already-seated connection is ignored.
    #[instrument(skip(self, outbox))]
    pub fn join(&self, conn: ConnId, outbox: Outbox, key: &str) {
        let mut guard = self.registry.lock().unwrap();
        let Registry { rooms, tags } = &mut *guard;

        if tags.contains_key(&conn) {
            debug!(conn, "Join from a connection already in a room, ignoring");
            return;
        }

        let room = rooms.entry(key.to_owned()).or_insert_with(|| {
            info!(room = key, "Creating room");
            Room::new()
        });

        if room.participants.len() >= 2 {
            warn!(conn, room = key, "Room already has 2 participants");
            let _ = outbox.send(ServerMessage::Full);
            return;
        }

        let mark = if room.participants.is_empty() {
            Mark::X
        } else {
            Mark::O
        };
        room.participants.push(Participant {
            conn,
            mark,
            outbox: outbox.clone(),
        });
        tags.insert(
            conn,
            RoomTag {
                room: key.to_owned(),
                mark,
            },
        );
        info!(conn, room = key, ?mark, "Participant joined");

        let _ = outbox.send(ServerMessage::Init {
            symbol: mark,
            board: room.board.cells(),
            turn: room.turn,
            players: room.participants.len(),
        });

        if room.participants.len() == 2 {
            info!(room = key, "Room paired up, game starting");
            room.broadcast(&ServerMessage::Start);
        }
    }

    /// Applies a move from a connection to its room.
    ///
    /// Accepted only when the room is in progress, the cell is in
    /// range and empty, and it is the sender's turn; every other case
    /// is dropped without emission. An accepted move is broadcast to
    /// all participants, carrying the winner and winning triple once
    /// the game ends.
    #[instrument(skip(self))]
    pub fn apply_move(&self, conn: ConnId, index: usize) {
        let mut guard = self.registry.lock().unwrap();
        let Registry { rooms, tags } = &mut *guard;

        let Some(tag) = tags.get(&conn) else {
            debug!(conn, "Move from a connection with no room, ignoring");
            return;
        };
        let Some(room) = rooms.get_mut(&tag.room) else {
            debug!(conn, room = %tag.room, "Move against a room no longer in the registry");
            return;
        };

        if room.status() != RoomStatus::InProgress {
            debug!(conn, room = %tag.room, status = ?room.status(), "Move outside an active game, ignoring");
            return;
        }
        if !room.board.is_empty(index) {
            debug!(conn, index, "Move to an occupied or out-of-range cell, ignoring");
            return;
        }
        if tag.mark != room.turn {
            debug!(conn, ?tag.mark, turn = ?room.turn, "Move out of turn, ignoring");
            return;
        }

        room.board = rules::apply_move(&room.board, index, tag.mark);

        if let Some(winner) = rules::check_winner(&room.board) {
            room.winner = Some(winner);
            info!(room = %tag.room, ?winner, "Game won");
        } else if rules::is_full(&room.board) {
            info!(room = %tag.room, "Game drawn");
        } else {
            room.turn = room.turn.opponent();
        }

        room.broadcast(&ServerMessage::Update {
            board: room.board.cells(),
            turn: room.turn,
            winner: room.winner,
            winning_line: room
                .winner
                .and_then(|w| rules::winning_line(&room.board, w)),
        });
    }

    /// Resets a finished game for another round.
    ///
    /// Participants keep their seats and marks; the board is cleared
    /// and the turn returns to X. Ignored unless the sender's room is
    /// finished.
    #[instrument(skip(self))]
    pub fn restart(&self, conn: ConnId) {
        let mut guard = self.registry.lock().unwrap();
        let Registry { rooms, tags } = &mut *guard;

        let Some(tag) = tags.get(&conn) else {
            debug!(conn, "Restart from a connection with no room, ignoring");
            return;
        };
        let Some(room) = rooms.get_mut(&tag.room) else {
            debug!(conn, room = %tag.room, "Restart against a room no longer in the registry");
            return;
        };

        if room.status() != RoomStatus::Finished {
            debug!(conn, room = %tag.room, status = ?room.status(), "Restart of an unfinished game, ignoring");
            return;
        }

        room.board = Board::new();
        room.turn = Mark::X;
        room.winner = None;
        info!(room = %tag.room, "Game restarted");

        room.broadcast(&ServerMessage::Restart {
            board: room.board.cells(),
            turn: room.turn,
        });
    }

    /// Removes a connection from its room, if any.
    ///
    /// The tag and the seat are cleared together. The room is
    /// destroyed the instant its last participant leaves; otherwise
    /// the remaining participant is told their opponent left.
    #[instrument(skip(self))]
    pub fn disconnect(&self, conn: ConnId) {
        let mut guard = self.registry.lock().unwrap();
        let Registry { rooms, tags } = &mut *guard;

        let Some(tag) = tags.remove(&conn) else {
            debug!(conn, "Disconnect from the lobby");
            return;
        };
        let Some(room) = rooms.get_mut(&tag.room) else {
            return;
        };

        room.participants.retain(|p| p.conn != conn);
        info!(conn, room = %tag.room, "Participant left");

        if room.participants.is_empty() {
            rooms.remove(&tag.room);
            info!(room = %tag.room, "Room destroyed");
        } else {
            room.broadcast(&ServerMessage::OpponentLeft);
        }
    }

    /// Lists the keys of all live rooms.
    pub fn room_keys(&self) -> Vec<RoomKey> {
        let guard = self.registry.lock().unwrap();
        guard.rooms.keys().cloned().collect()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
