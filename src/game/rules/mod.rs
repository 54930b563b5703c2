//! Game rules for tic-tac-toe.
//!
//! Pure functions for applying moves and evaluating board state.
//! Rules are separated from board storage so the session layer can
//! compose them without carrying engine state between calls.

pub mod apply;
pub mod draw;
pub mod win;

pub use apply::apply_move;
pub use draw::{is_draw, is_full};
pub use win::{check_winner, winning_line};
