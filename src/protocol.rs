//! Wire protocol for the WebSocket channel.
//!
//! One JSON object per message, discriminated by the `type` field.
//! Board cells travel as `"X"`, `"O"`, or `null`; `winner` and
//! `winningLine` are always present in an update, `null` when absent.

use crate::game::Mark;
use serde::{Deserialize, Serialize};

/// Messages accepted from clients.
///
/// Anything that fails to parse into one of these variants is a
/// protocol violation and is dropped by the connection handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Join the room with the given key, creating it if unseen.
    Join {
        /// Caller-supplied room key.
        room: String,
    },
    /// Claim the given board cell for the sender's mark.
    Move {
        /// Board cell, 0-8 in row-major order.
        index: usize,
    },
    /// Reset a finished game for another round.
    Restart,
}

/// Messages pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Unicast reply to a successful join.
    Init {
        /// Mark assigned to the joiner.
        symbol: Mark,
        /// Current board state.
        board: [Option<Mark>; 9],
        /// Mark whose turn it is.
        turn: Mark,
        /// Number of participants in the room, the joiner included.
        players: usize,
    },
    /// Unicast reply to a join rejected for capacity.
    Full,
    /// Broadcast to both participants once the room is paired up.
    Start,
    /// Broadcast after every accepted move.
    Update {
        /// Board state after the move.
        board: [Option<Mark>; 9],
        /// Mark whose turn it is; unchanged when the move ended the game.
        turn: Mark,
        /// Recorded winner, `None` while ongoing or drawn.
        winner: Option<Mark>,
        /// The completed triple when a winner is recorded.
        #[serde(rename = "winningLine")]
        winning_line: Option<[usize; 3]>,
    },
    /// Broadcast after a game reset.
    Restart {
        /// The cleared board.
        board: [Option<Mark>; 9],
        /// Mark whose turn it is (always the first mark).
        turn: Mark,
    },
    /// Broadcast to the remaining participant when their opponent
    /// disconnects mid-session.
    #[serde(rename = "opponent-left")]
    OpponentLeft,
}
