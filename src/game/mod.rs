//! Tic-tac-toe game engine.
//!
//! Pure functions over a board representation: no I/O, no retained
//! state between calls. The session layer is responsible for all
//! legality checks before invoking the rules.

mod types;

pub mod rules;

pub use types::{Board, Mark, Square};
