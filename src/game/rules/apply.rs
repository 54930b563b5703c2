//! Move application for tic-tac-toe.

use super::super::{Board, Mark, Square};
use tracing::instrument;

/// Returns a copy of `board` with `mark` placed at `cell`.
///
/// Contract: `cell` is in range and empty. The session layer performs
/// every legality check before calling; this function does not
/// validate.
#[instrument]
pub fn apply_move(board: &Board, cell: usize, mark: Mark) -> Board {
    let mut next = board.clone();
    next.set(cell, Square::Occupied(mark));
    next
}
