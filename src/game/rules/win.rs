//! Win detection logic for tic-tac-toe.

use super::super::{Board, Mark, Square};
use tracing::instrument;

/// The 8 winning triples, scanned in this fixed order everywhere win
/// detection runs so `check_winner` and `winning_line` always agree.
pub(crate) const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(mark)` for the mark occupying the first fully-matched
/// triple, `None` if no triple is uniformly occupied.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Mark> {
    for [a, b, c] in LINES {
        let sq = board.get(a).unwrap_or(Square::Empty);
        if sq != Square::Empty && board.get(b) == Some(sq) && board.get(c) == Some(sq) {
            return sq.mark();
        }
    }

    None
}

/// Returns the triple fully occupied by `mark`, scanning in the same
/// fixed order as [`check_winner`].
///
/// Returns `None` if the mark has no completed triple.
#[instrument]
pub fn winning_line(board: &Board, mark: Mark) -> Option<[usize; 3]> {
    let want = Square::Occupied(mark);
    LINES
        .into_iter()
        .find(|&[a, b, c]| {
            board.get(a) == Some(want) && board.get(b) == Some(want) && board.get(c) == Some(want)
        })
}
